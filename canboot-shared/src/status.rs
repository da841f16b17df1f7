//! Status channel codes.

/// Outcome code transmitted on the status channel.
///
/// The 32-bit payload of a status message is exactly one of these values;
/// there is no further payload schema.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    /// Image committed, sentinel armed.
    Success = 0x0000_8000,
    /// Programming a payload word failed.
    ProgramFailed = 0xFFFF_FFFC,
    /// Word 0 of the header did not match the image key.
    BadKey = 0xFFFF_FFFD,
    /// Erasing the target sector failed.
    EraseFailed = 0xFFFF_FFFE,
    /// A message arrived with an unexpected sequence counter.
    SequenceFault = 0xFFFF_FFFF,
}

/// Value is not a known status code.
pub struct UnknownStatus;

impl TryFrom<u32> for Status {
    type Error = UnknownStatus;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        let status = match value {
            0x0000_8000 => Status::Success,
            0xFFFF_FFFC => Status::ProgramFailed,
            0xFFFF_FFFD => Status::BadKey,
            0xFFFF_FFFE => Status::EraseFailed,
            0xFFFF_FFFF => Status::SequenceFault,
            _ => return Err(UnknownStatus),
        };
        Ok(status)
    }
}
