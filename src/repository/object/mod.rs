use bstr::ByteSlice;

use crate::error::{Error, Result};

pub mod blob;
pub mod commit;
pub mod tree;

/// The kind of a stored object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Blob,
    Tree,
    Commit,
}

impl ObjectKind {
    /// ASCII token used in object headers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
        }
    }

    fn from_token(token: &[u8]) -> Option<Self> {
        match token {
            b"blob" => Some(Self::Blob),
            b"tree" => Some(Self::Tree),
            b"commit" => Some(Self::Commit),
            _ => None,
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything that can be framed and stored as a loose object.
pub trait Object {
    fn kind(&self) -> ObjectKind;

    /// The object payload, before header framing.
    fn to_bytes(&self) -> Vec<u8>;
}

/// Parsed `"{kind} {len}"` object header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    pub kind: ObjectKind,
    pub size: usize,
}

/// Build canonical object bytes: `"{kind} {len}\0{payload}"`.
///
/// `len` is the payload's byte length. Payloads are not text and may contain
/// any byte value, so everything past the NUL is copied verbatim.
pub fn encode(kind: ObjectKind, payload: &[u8]) -> Vec<u8> {
    let mut content = Vec::with_capacity(payload.len() + 16);
    content.extend_from_slice(kind.as_str().as_bytes());
    content.push(b' ');
    content.extend_from_slice(payload.len().to_string().as_bytes());
    content.push(0);
    content.extend_from_slice(payload);
    content
}

/// Split canonical bytes at the first NUL into raw header and payload.
pub fn split(bytes: &[u8]) -> Result<(&[u8], &[u8])> {
    let nul = bytes
        .find_byte(0)
        .ok_or_else(|| Error::MalformedObject("no NUL separator after header".into()))?;
    Ok((&bytes[..nul], &bytes[nul + 1..]))
}

/// Parse a raw `"{kind} {len}"` header.
pub fn parse_header(header: &[u8]) -> Result<Header> {
    let space = header
        .find_byte(b' ')
        .ok_or_else(|| Error::MalformedObject("header has no space after kind".into()))?;

    let kind = ObjectKind::from_token(&header[..space]).ok_or_else(|| {
        Error::MalformedObject(format!("unknown object kind {:?}", header[..space].as_bstr()))
    })?;

    let size = header[space + 1..]
        .to_str()
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .ok_or_else(|| Error::MalformedObject("header length is not decimal".into()))?;

    Ok(Header { kind, size })
}

/// Split and parse in one step, verifying the declared length against the
/// actual payload.
pub fn decode(bytes: &[u8]) -> Result<(Header, &[u8])> {
    let (header, payload) = split(bytes)?;
    let header = parse_header(header)?;

    if header.size != payload.len() {
        return Err(Error::MalformedObject(format!(
            "declared length {} but payload is {} bytes",
            header.size,
            payload.len()
        )));
    }

    Ok((header, payload))
}
