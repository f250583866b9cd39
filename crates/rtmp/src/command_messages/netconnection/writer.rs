//! Writing [`NetConnectionCommand`].

use std::io;

use hylan_amf0::Amf0Value;
use hylan_amf0::encoder::Amf0Encoder;

use super::{NetConnectionCommand, NetConnectionCommandConnectResult};
use crate::command_messages::error::CommandError;

impl NetConnectionCommand<'_> {
    /// Writes a [`NetConnectionCommand`] to the given writer.
    pub fn write(self, buf: &mut impl io::Write, transaction_id: f64) -> Result<(), CommandError> {
        let mut encoder = Amf0Encoder::new(buf);

        match self {
            Self::ConnectResult(NetConnectionCommandConnectResult {
                fmsver,
                capabilities,
                level,
                code,
                description,
                encoding,
            }) => {
                encoder.encode_string("_result")?;
                encoder.encode_number(transaction_id)?;

                let properties: Vec<_> = vec![
                    ("fmsVer".into(), Amf0Value::String(fmsver.as_ref().into())),
                    ("capabilities".into(), Amf0Value::Number(capabilities)),
                ];
                encoder.encode_object(&properties.into())?;

                let information: Vec<_> = vec![
                    ("level".into(), Amf0Value::String(level.to_string().into())),
                    ("code".into(), Amf0Value::String(code.as_ref().into())),
                    ("description".into(), Amf0Value::String(description.as_ref().into())),
                    ("objectEncoding".into(), Amf0Value::Number(encoding)),
                ];
                encoder.encode_object(&information.into())?;
            }
            Self::CreateStreamResult { stream_id } => {
                encoder.encode_string("_result")?;
                encoder.encode_number(transaction_id)?;
                encoder.encode_null()?;
                encoder.encode_number(stream_id)?;
            }
            Self::Connect(_) | Self::Call | Self::Close | Self::CreateStream => {
                return Err(CommandError::NoClientImplementation);
            }
        }

        Ok(())
    }
}
