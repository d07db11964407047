//! Decoding seam between the establishment procedure and the NAS codec

use nextgsim_nas::{decode_sm_message, ExtendedProtocolConfigurationOptions, ProtocolContainer, SmMessage};

use crate::error::DecodeError;

/// 5GSM decoding used by the establishment procedure
pub trait SmCodec {
    /// Decode a plain 5GSM message
    fn decode_sm(&self, data: &[u8]) -> Result<SmMessage, DecodeError>;

    /// Decode ePCO contents into its units, in wire order
    fn decode_epco(&self, data: &[u8]) -> Result<Vec<ProtocolContainer>, DecodeError>;
}

/// [`SmCodec`] backed by `nextgsim-nas`
#[derive(Debug, Clone, Copy, Default)]
pub struct NasSmCodec;

impl SmCodec for NasSmCodec {
    fn decode_sm(&self, data: &[u8]) -> Result<SmMessage, DecodeError> {
        Ok(decode_sm_message(data)?)
    }

    fn decode_epco(&self, data: &[u8]) -> Result<Vec<ProtocolContainer>, DecodeError> {
        Ok(ExtendedProtocolConfigurationOptions::decode(data)?.containers)
    }
}
