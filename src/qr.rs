//! QR rendering seam
//!
//! The wrapper computes the verification payload itself but never renders
//! pixels: rendering is delegated to a [`QrRenderer`] supplied by the
//! caller, typically backed by an external generator. The methods here wire
//! a renderer to the payload and handle the embedding and file-output
//! plumbing around it.

use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::cfdi::Cfdi;
use crate::error::{Error, Result};

/// Renders a QR code for a payload string at a given pixel size
pub trait QrRenderer {
    /// Produce encoded image bytes (format is the renderer's choice)
    fn encode(&self, payload: &str, width: u32, height: u32) -> Result<Vec<u8>>;
}

impl Cfdi {
    /// Render the verification QR as raw image bytes
    pub fn qr_image<R: QrRenderer>(&self, renderer: &R, width: u32, height: u32) -> Result<Vec<u8>> {
        let payload = self.qr_payload()?;
        renderer.encode(&payload, width, height)
    }

    /// Render the verification QR and base64-encode it for embedding
    pub fn qr_base64<R: QrRenderer>(&self, renderer: &R, width: u32, height: u32) -> Result<String> {
        let image = self.qr_image(renderer, width, height)?;
        Ok(STANDARD.encode(image))
    }

    /// Render the verification QR to a file
    ///
    /// Fails with [`Error::FileAlreadyExists`] when the target exists and
    /// `overwrite` is false.
    pub fn qr_to_file<R: QrRenderer>(
        &self,
        renderer: &R,
        path: impl AsRef<Path>,
        width: u32,
        height: u32,
        overwrite: bool,
    ) -> Result<()> {
        let path = path.as_ref();
        if path.exists() && !overwrite {
            return Err(Error::FileAlreadyExists(path.to_path_buf()));
        }
        let image = self.qr_image(renderer, width, height)?;
        fs::write(path, image)?;
        Ok(())
    }
}
