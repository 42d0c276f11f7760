//! Config block validation
//!
//! Join requests carry an untrusted serialized block. Everything in here runs
//! before the ledger manager is touched: decode the envelope chain, make sure
//! the block is a CONFIG block, pull the channel id out of the channel header
//! and classify the channel configuration.

use prost::Message;

use crate::constants::{channel_id, config_keys};
use crate::errors::BlockError;
use crate::protos::{
    Block, BlockData, BlockHeader, ChannelHeader, Config, ConfigEnvelope, Envelope, Header,
    HeaderType, Payload,
};

/// A block that passed validation, with the pieces callers need
#[derive(Debug, Clone)]
pub struct ConfigBlock {
    pub channel_id: String,
    pub block: Block,
    pub config: Config,
    pub is_system_channel: bool,
}

/// Decode and validate a serialized config block.
///
/// When `expected_channel_id` is given the embedded channel id must equal it.
pub fn validate_config_block(
    bytes: &[u8],
    expected_channel_id: Option<&str>,
) -> Result<ConfigBlock, BlockError> {
    let block = unmarshal_block(bytes)?;
    validate_block(block, expected_channel_id)
}

/// Same as [`validate_config_block`] for an already decoded block
pub fn validate_block(
    block: Block,
    expected_channel_id: Option<&str>,
) -> Result<ConfigBlock, BlockError> {
    let envelope = first_envelope(&block)?;
    let payload = decode::<Payload>(&envelope.payload, "payload")?;
    let header = payload.header.as_ref().ok_or(BlockError::MissingHeader)?;
    let channel_header = decode::<ChannelHeader>(&header.channel_header, "channel header")?;

    if !matches!(
        HeaderType::try_from(channel_header.r#type),
        Ok(HeaderType::Config)
    ) {
        return Err(BlockError::NotConfigBlock);
    }

    let config_envelope = decode::<ConfigEnvelope>(&payload.data, "config envelope")?;
    let config = config_envelope.config.ok_or(BlockError::MissingConfig)?;

    let embedded = channel_header.channel_id;
    validate_channel_id(&embedded)?;

    if let Some(specified) = expected_channel_id {
        if specified != embedded {
            return Err(BlockError::ChannelIdMismatch {
                specified: specified.to_string(),
                embedded,
            });
        }
    }

    let is_system_channel = is_system_channel_config(&config);

    Ok(ConfigBlock {
        channel_id: embedded,
        block,
        config,
        is_system_channel,
    })
}

/// Decode raw bytes into a block
pub fn unmarshal_block(bytes: &[u8]) -> Result<Block, BlockError> {
    decode::<Block>(bytes, "block")
}

/// Extract the channel id from a block without checking its type.
///
/// Used for local sanity checks before a block is sent anywhere.
pub fn channel_id_from_block(block: &Block) -> Result<String, BlockError> {
    let envelope = first_envelope(block)?;
    let payload = decode::<Payload>(&envelope.payload, "payload")?;
    let header = payload.header.ok_or(BlockError::MissingHeader)?;
    let channel_header = decode::<ChannelHeader>(&header.channel_header, "channel header")?;
    Ok(channel_header.channel_id)
}

/// Check channel naming rules: `[a-z][a-z0-9.-]*`, at most 249 characters
pub fn validate_channel_id(id: &str) -> Result<(), BlockError> {
    let invalid = |reason: String| BlockError::InvalidChannelId {
        channel_id: id.to_string(),
        reason,
    };

    if id.is_empty() {
        return Err(invalid("channel ID is empty".to_string()));
    }
    if id.len() > channel_id::MAX_LENGTH {
        return Err(invalid(format!(
            "channel ID exceeds {} characters",
            channel_id::MAX_LENGTH
        )));
    }

    let mut chars = id.chars();
    if let Some(first) = chars.next() {
        if !first.is_ascii_lowercase() {
            return Err(invalid(
                "channel ID must start with a lowercase letter".to_string(),
            ));
        }
    }
    if let Some(bad) =
        chars.find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '.' || *c == '-'))
    {
        return Err(invalid(format!(
            "character '{}' is not allowed, use [a-z0-9.-]",
            bad
        )));
    }

    Ok(())
}

/// A channel config without an application group is a system channel config
pub fn is_system_channel_config(config: &Config) -> bool {
    config
        .channel_group
        .as_ref()
        .map(|group| !group.groups.contains_key(config_keys::APPLICATION_GROUP))
        .unwrap_or(true)
}

/// Extract the channel configuration carried by a config block
pub fn config_from_block(block: &Block) -> Result<Config, BlockError> {
    validate_block(block.clone(), None).map(|validated| validated.config)
}

/// Build a number-0 config block carrying `config` for `channel_id`
pub fn config_block(channel_id: &str, config: Config) -> Block {
    let payload = Payload {
        header: Some(Header {
            channel_header: ChannelHeader {
                r#type: HeaderType::Config as i32,
                channel_id: channel_id.to_string(),
                ..Default::default()
            }
            .encode_to_vec(),
            signature_header: Vec::new(),
        }),
        data: ConfigEnvelope {
            config: Some(config),
            last_update: None,
        }
        .encode_to_vec(),
    };

    let envelope = Envelope {
        payload: payload.encode_to_vec(),
        signature: Vec::new(),
    };

    Block {
        header: Some(BlockHeader {
            number: 0,
            ..Default::default()
        }),
        data: Some(BlockData {
            data: vec![envelope.encode_to_vec()],
        }),
        metadata: None,
    }
}

fn first_envelope(block: &Block) -> Result<Envelope, BlockError> {
    let first = block
        .data
        .as_ref()
        .and_then(|data| data.data.first())
        .ok_or(BlockError::Empty)?;
    decode::<Envelope>(first, "envelope")
}

fn decode<M: Message + Default>(bytes: &[u8], what: &'static str) -> Result<M, BlockError> {
    M::decode(bytes).map_err(|e| BlockError::Decode {
        what,
        reason: e.to_string(),
    })
}
