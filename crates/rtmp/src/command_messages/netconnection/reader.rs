//! Reading [`NetConnectionCommand`].

use std::borrow::Cow;

use bytes::Bytes;
use hylan_amf0::Amf0Value;
use hylan_amf0::decoder::Amf0Decoder;

use super::{CapsExMask, NetConnectionCommand, NetConnectionCommandConnect};
use crate::command_messages::error::CommandError;

impl NetConnectionCommand<'_> {
    /// Reads a [`NetConnectionCommand`] from the given decoder.
    ///
    /// Returns `Ok(None)` if the `command_name` is not recognized.
    pub fn read(command_name: &str, decoder: &mut Amf0Decoder<Bytes>) -> Result<Option<Self>, CommandError> {
        match command_name {
            "connect" => Ok(Some(Self::Connect(Self::read_connect(decoder)?))),
            "call" => {
                // We don't act on `call`, but still consume its arguments so the
                // decoder ends up at the right position.
                decoder.decode_value()?;
                if decoder.has_remaining() {
                    decoder.decode_value()?;
                }
                Ok(Some(Self::Call))
            }
            "close" => Ok(Some(Self::Close)),
            "createStream" => Ok(Some(Self::CreateStream)),
            _ => Ok(None),
        }
    }

    fn read_connect(decoder: &mut Amf0Decoder<Bytes>) -> Result<NetConnectionCommandConnect<'static>, CommandError> {
        let command_object = decoder.decode_object()?;

        let mut app = None;
        let mut caps_ex = None;
        let mut others = Vec::new();

        for (key, value) in command_object.into_owned() {
            match (key.as_str(), value) {
                ("app", Amf0Value::String(value)) => app = Some(Cow::Owned(value.as_str().to_string())),
                ("capsEx", Amf0Value::Number(value)) => caps_ex = Some(CapsExMask::from(value as u8)),
                (_, value) => others.push((key, value)),
            }
        }

        Ok(NetConnectionCommandConnect {
            app: app.ok_or(CommandError::NoAppName)?,
            caps_ex,
            others: others.into(),
        })
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use bytes::Bytes;
    use hylan_amf0::Amf0Object;
    use hylan_amf0::decoder::Amf0Decoder;
    use hylan_amf0::encoder::Amf0Encoder;

    use super::NetConnectionCommand;
    use crate::command_messages::error::CommandError;

    #[test]
    fn test_read_no_app() {
        let mut command_object = Vec::new();
        let mut encoder = Amf0Encoder::new(&mut command_object);
        encoder.encode_object(&Amf0Object::default()).unwrap();

        let mut decoder = Amf0Decoder::new(Bytes::from_owner(command_object));
        let result = NetConnectionCommand::read("connect", &mut decoder).unwrap_err();

        assert!(matches!(result, CommandError::NoAppName));
    }
}
