//! Common test data and constants

use channeld::configblock;
use channeld::constants::ledger_files;
use channeld::ledger::SnapshotMetadata;
use channeld::protos::{
    Block, BlockData, BlockHeader, ChannelHeader, Config, ConfigGroup, Envelope, Header,
    HeaderType, Payload,
};
use prost::Message;
use std::collections::HashMap;
use std::path::Path;

/// Common test channel names
pub mod channels {
    pub const APPLE: &str = "apple";
    pub const BANANA: &str = "banana";
    pub const CHERRY: &str = "cherry";
    pub const SYSTEM: &str = "system-channel";
    pub const SNAPSHOT: &str = "snapchannel";
}

fn channel_config(with_application: bool) -> Config {
    let mut groups = HashMap::new();
    if with_application {
        groups.insert("Application".to_string(), ConfigGroup::default());
    } else {
        groups.insert("Orderer".to_string(), ConfigGroup::default());
    }
    Config {
        sequence: 0,
        channel_group: Some(ConfigGroup {
            groups,
            ..Default::default()
        }),
    }
}

/// Genesis block of an application channel
pub fn app_genesis_block(channel_id: &str) -> Block {
    configblock::config_block(channel_id, channel_config(true))
}

/// Genesis block of a system channel (no application group)
pub fn system_genesis_block(channel_id: &str) -> Block {
    configblock::config_block(channel_id, channel_config(false))
}

/// A block carrying an endorser transaction instead of a config
pub fn non_config_block(channel_id: &str) -> Block {
    let payload = Payload {
        header: Some(Header {
            channel_header: ChannelHeader {
                r#type: HeaderType::EndorserTransaction as i32,
                channel_id: channel_id.to_string(),
                ..Default::default()
            }
            .encode_to_vec(),
            signature_header: Vec::new(),
        }),
        data: vec![1, 2, 3],
    };
    Block {
        header: Some(BlockHeader {
            number: 7,
            ..Default::default()
        }),
        data: Some(BlockData {
            data: vec![Envelope {
                payload: payload.encode_to_vec(),
                signature: Vec::new(),
            }
            .encode_to_vec()],
        }),
        metadata: None,
    }
}

/// Write a snapshot directory understood by `FileLedgerManager`
pub async fn write_snapshot(dir: &Path, channel_id: &str, last_block_number: u64) {
    tokio::fs::create_dir_all(dir).await.unwrap();
    let metadata = SnapshotMetadata {
        channel_name: channel_id.to_string(),
        last_block_number,
    };
    tokio::fs::write(
        dir.join(ledger_files::SNAPSHOT_METADATA),
        serde_json::to_vec(&metadata).unwrap(),
    )
    .await
    .unwrap();
    tokio::fs::write(
        dir.join(ledger_files::CONFIG_BLOCK),
        app_genesis_block(channel_id).encode_to_vec(),
    )
    .await
    .unwrap();
}

/// Creation callback that records every channel it is invoked for
pub fn recording_callback() -> (
    channeld::channel::ChannelCreatedCallback,
    std::sync::Arc<std::sync::Mutex<Vec<String>>>,
) {
    let created = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let recorder = created.clone();
    let callback: channeld::channel::ChannelCreatedCallback =
        std::sync::Arc::new(move |channel_id: &str| {
            recorder.lock().unwrap().push(channel_id.to_string());
        });
    (callback, created)
}
