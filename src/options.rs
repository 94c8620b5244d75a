#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

//===========================================================================//

/// The sizes generated when none are requested explicitly.
pub const DEFAULT_SIZES: &[u32] = &[16, 24, 32, 48, 64, 96, 128, 256];

//===========================================================================//

/// Configuration for ICO generation.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct IcoOptions {
    /// The icon sizes (in pixels) to generate, one directory entry per
    /// element.  Order is preserved in the output, duplicates are allowed,
    /// and every size must be nonzero.
    pub sizes: Vec<u32>,
}

impl Default for IcoOptions {
    fn default() -> IcoOptions {
        IcoOptions { sizes: DEFAULT_SIZES.to_vec() }
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{IcoOptions, DEFAULT_SIZES};

    #[test]
    fn default_sizes() {
        assert_eq!(
            IcoOptions::default().sizes,
            vec![16, 24, 32, 48, 64, 96, 128, 256]
        );
        assert_eq!(IcoOptions::default().sizes, DEFAULT_SIZES);
    }
}

//===========================================================================//
