/// Failures reported by an I2S controller driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A configuration or pin value was rejected by the driver.
    InvalidArgument,
    /// Operation issued in the wrong lifecycle state, such as pins before
    /// install.
    InvalidState,
    /// DMA descriptors could not be allocated.
    NoMemory,
    /// The requested controller or pin does not exist on this part.
    NotFound,
    /// The DMA engine reported a fault while receiving.
    Dma,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::InvalidArgument => write!(f, "invalid argument"),
            Error::InvalidState => write!(f, "invalid driver state"),
            Error::NoMemory => write!(f, "out of DMA memory"),
            Error::NotFound => write!(f, "no such controller or pin"),
            Error::Dma => write!(f, "DMA receive fault"),
        }
    }
}
