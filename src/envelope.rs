//! The binary container.
//!
//! Binary units wrap the same text grammar in a fixed 56-byte header followed by
//! AES-256-CBC ciphertext. The decrypted payload is either the text itself or a
//! compressed stream of it.
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 4 | signature, `0x43736353` little-endian (`ScsC`) |
//! | 4 | 32 | authentication tag, carried but not verified |
//! | 36 | 16 | initialization vector |
//! | 52 | 4 | size of the decompressed text, advisory only |
//!
//! ```rust
//! use sii_unit::envelope::{open, seal};
//! use sii_unit::SealOptions;
//!
//! let text = b"SiiNunit\n{\n}\n";
//! let sealed = seal(text, &SealOptions::new())?;
//! assert_eq!(open(&sealed)?, text);
//! # Ok::<(), sii_unit::Error>(())
//! ```

use crate::{Compression, Error, Result, SealOptions};
use aes::Aes256;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use std::io::{Read, Write};
use tracing::debug;

/// Signature of plain text units.
pub const TEXT_SIGNATURE: &[u8; 8] = b"SiiNunit";

/// Signature of the binary container, read as a little-endian `u32`.
pub const ENCRYPTED_SIGNATURE: u32 = 0x4373_6353;

/// The key every binary container is encrypted with.
///
/// This is a fixed property of the file format, shared by every reader and writer
/// of these files. It is not a secret.
pub const ENCRYPTION_KEY: [u8; 32] = [
    0x2a, 0x5f, 0xcb, 0x17, 0x91, 0xd2, 0x2f, 0xb6, 0x02, 0x45, 0xb3, 0xd8, 0x36, 0x9e, 0xd0,
    0xb2, 0xc2, 0x73, 0x71, 0x56, 0x3f, 0xbf, 0x1f, 0x3c, 0x9e, 0xdf, 0x6b, 0x11, 0x82, 0x5a,
    0x5d, 0x0a,
];

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

type Aes256CbcDec = cbc::Decryptor<Aes256>;
type Aes256CbcEnc = cbc::Encryptor<Aes256>;

/// The fixed header of a binary container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiiHeader {
    pub signature: u32,
    pub hmac: [u8; 32],
    pub iv: [u8; 16],
    pub data_size: u32,
}

impl SiiHeader {
    pub const SIZE: usize = 56;

    /// Parses the header at the start of `data`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if `data` is shorter than a header or does
    /// not carry the container signature.
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        let data: &[u8; Self::SIZE] = data
            .first_chunk()
            .ok_or_else(|| Error::invalid_format("truncated container header"))?;

        let signature = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
        if signature != ENCRYPTED_SIGNATURE {
            return Err(Error::invalid_format("missing container signature"));
        }

        let mut hmac = [0; 32];
        hmac.copy_from_slice(&data[4..36]);
        let mut iv = [0; 16];
        iv.copy_from_slice(&data[36..52]);
        let data_size = u32::from_le_bytes([data[52], data[53], data[54], data[55]]);

        Ok(SiiHeader {
            signature,
            hmac,
            iv,
            data_size,
        })
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0; Self::SIZE];
        out[..4].copy_from_slice(&self.signature.to_le_bytes());
        out[4..36].copy_from_slice(&self.hmac);
        out[36..52].copy_from_slice(&self.iv);
        out[52..].copy_from_slice(&self.data_size.to_le_bytes());
        out
    }
}

/// Returns `true` if `data` starts with the text signature, optionally after a
/// UTF-8 byte order mark.
#[must_use]
pub fn is_text(data: &[u8]) -> bool {
    data.strip_prefix(UTF8_BOM)
        .unwrap_or(data)
        .starts_with(TEXT_SIGNATURE)
}

/// Returns `true` if `data` starts with the container signature.
#[must_use]
pub fn is_encrypted(data: &[u8]) -> bool {
    data.first_chunk::<4>()
        .map_or(false, |sig| u32::from_le_bytes(*sig) == ENCRYPTED_SIGNATURE)
}

/// Decrypts container ciphertext with the format key and `iv`.
///
/// # Errors
///
/// Returns [`Error::Crypto`] if the ciphertext is not a whole number of blocks or
/// its padding is invalid.
pub fn decrypt(cipher: &[u8], iv: &[u8; 16]) -> Result<Vec<u8>> {
    Aes256CbcDec::new(&ENCRYPTION_KEY.into(), iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(cipher)
        .map_err(|_| Error::crypto("invalid ciphertext length or padding"))
}

/// Encrypts `plain` with the format key, returning the ciphertext and the IV used.
///
/// A random IV is drawn when none is given.
#[must_use]
pub fn encrypt(plain: &[u8], iv: Option<[u8; 16]>) -> (Vec<u8>, [u8; 16]) {
    let iv = iv.unwrap_or_else(rand::random);
    let cipher =
        Aes256CbcEnc::new(&ENCRYPTION_KEY.into(), &iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plain);
    (cipher, iv)
}

/// Compresses `data` with the given stream format.
pub fn compress(data: &[u8], compression: Compression) -> Result<Vec<u8>> {
    let level = flate2::Compression::default();
    match compression {
        Compression::None => Ok(data.to_vec()),
        Compression::Gzip => {
            let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2), level);
            encoder.write_all(data)?;
            Ok(encoder.finish()?)
        }
        Compression::Zlib => {
            let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2), level);
            encoder.write_all(data)?;
            Ok(encoder.finish()?)
        }
    }
}

/// Decompresses a gzip member or, failing the gzip magic, a zlib stream.
///
/// # Errors
///
/// Returns [`Error::InvalidFormat`] if the stream is corrupt.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() * 4);
    let result = if data.starts_with(&GZIP_MAGIC) {
        debug!("decompressing gzip payload");
        GzDecoder::new(data).read_to_end(&mut out)
    } else {
        debug!("decompressing zlib payload");
        ZlibDecoder::new(data).read_to_end(&mut out)
    };

    result.map_err(|e| Error::invalid_format(&format!("corrupt compressed payload: {}", e)))?;
    Ok(out)
}

/// Unwraps a binary container into unit text bytes.
///
/// # Errors
///
/// - [`Error::InvalidFormat`] for a bad header or a corrupt compressed payload
/// - [`Error::Crypto`] if decryption fails
pub fn open(data: &[u8]) -> Result<Vec<u8>> {
    let header = SiiHeader::from_slice(data)?;
    debug!(size_hint = header.data_size, "parsed container header");

    let plain = decrypt(&data[SiiHeader::SIZE..], &header.iv)?;
    if is_text(&plain) {
        debug!("container holds uncompressed text");
        return Ok(plain);
    }
    decompress(&plain)
}

/// Wraps unit text into a binary container.
///
/// The authentication tag is written as zeros; readers do not verify it.
pub fn seal(text: &[u8], options: &SealOptions) -> Result<Vec<u8>> {
    let payload = compress(text, options.compression)?;
    let (cipher, iv) = encrypt(&payload, options.iv);

    let header = SiiHeader {
        signature: ENCRYPTED_SIGNATURE,
        hmac: [0; 32],
        iv,
        data_size: u32::try_from(text.len()).unwrap_or(u32::MAX),
    };
    debug!(
        compression = ?options.compression,
        size = text.len(),
        "sealing container"
    );

    let mut out = Vec::with_capacity(SiiHeader::SIZE + cipher.len());
    out.extend_from_slice(&header.to_bytes());
    out.extend_from_slice(&cipher);
    Ok(out)
}
