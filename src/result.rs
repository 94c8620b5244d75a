use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

//===========================================================================//

/// The finished product of a conversion: the ICO byte buffer plus the size
/// list that produced it.  The derived views (base64, data URL) are
/// computed on demand rather than cached.
#[derive(Clone, Debug)]
pub struct IcoResult {
    data: Vec<u8>,
    sizes: Vec<u32>,
}

impl IcoResult {
    pub(crate) fn new(data: Vec<u8>, sizes: Vec<u32>) -> IcoResult {
        IcoResult { data, sizes }
    }

    /// Returns the ICO file contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the result, returning the ICO file contents.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Returns the length of the ICO file, in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the ICO buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the sizes that were rendered, in directory order.
    pub fn sizes(&self) -> &[u32] {
        &self.sizes
    }

    /// Returns the ICO file contents as base64 text.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }

    /// Returns a `data:image/x-icon;base64,...` URL for the ICO file.
    pub fn to_data_url(&self) -> String {
        format!("data:image/x-icon;base64,{}", self.to_base64())
    }
}

//===========================================================================//


//===========================================================================//
