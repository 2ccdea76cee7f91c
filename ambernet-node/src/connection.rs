//! The per-connection task loop: decode, dispatch, encode, repeat until
//! EOF or a codec error closes the connection. Frames are not
//! length-prefixed on their own — a stream layer is expected to provide
//! message boundaries; this is that stream layer, a 4-byte big-endian
//! length prefix around each frame.

use chrono::{DateTime, Utc};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use ambernet_codec::frame::ErrorReason;
use ambernet_codec::Frame;
use ambernet_dispatch::Collaborators;

/// Maximum frame payload this loop will allocate a buffer for. Guards
/// against a peer claiming an absurd length prefix; chosen well above
/// the default maximum transaction content size (3.5 MiB) to leave room
/// for a transaction's other fields.
const MAX_FRAME_LEN: u32 = 16 * 1024 * 1024;

/// Drive one connection to completion. `now` is called once per frame,
/// matching the validator's "no wall-clock reads inside the dispatcher"
/// rule — the loop is the thing that's allowed to read the clock.
pub async fn run_connection<S>(
    mut stream: S,
    collaborators: &Collaborators<'_>,
    mut now: impl FnMut() -> DateTime<Utc>,
) -> std::io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    loop {
        let mut len_buf = [0u8; 4];
        if let Err(error) = stream.read_exact(&mut len_buf).await {
            return match error.kind() {
                std::io::ErrorKind::UnexpectedEof => Ok(()),
                _ => Err(error),
            };
        }
        let len = u32::from_be_bytes(len_buf);
        if len > MAX_FRAME_LEN {
            tracing::warn!(len, "peer announced an oversized frame; closing connection");
            return Ok(());
        }

        let mut payload = vec![0u8; len as usize];
        stream.read_exact(&mut payload).await?;

        let response = match ambernet_codec::decode(&payload) {
            Ok((frame, _remainder)) => ambernet_dispatch::process(frame, now(), collaborators).await,
            Err(error) => {
                tracing::debug!(%error, "dropping malformed frame");
                Frame::Error { reason: ErrorReason::InvalidTransaction }
            }
        };

        let encoded = match ambernet_codec::encode(&response) {
            Ok(bytes) => bytes,
            Err(error) => {
                tracing::warn!(%error, "failed to encode response frame; substituting network_issue");
                ambernet_codec::encode(&Frame::Error { reason: ErrorReason::NetworkIssue })
                    .expect("an Error frame always encodes")
            }
        };
        stream.write_u32(encoded.len() as u32).await?;
        stream.write_all(&encoded).await?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ambernet_crypto::algorithm::HashAlgorithm;
    use ambernet_crypto::TaggedHash;
    use std::collections::HashSet;
    use tokio::io::duplex;

    #[tokio::test]
    async fn ping_round_trips_through_the_length_prefixed_framing() {
        let context = crate::bootstrap::bootstrap(
            crate::bootstrap::BootstrapConfig {
                node_shared_secrets_genesis_address: TaggedHash::compute(HashAlgorithm::Sha256, b"nss"),
                origin_genesis_addresses: HashSet::new(),
                reward_genesis_address: TaggedHash::compute(HashAlgorithm::Sha256, b"reward"),
                node_rewards_genesis_address: TaggedHash::compute(HashAlgorithm::Sha256, b"node-reward"),
                oracle_genesis_address: TaggedHash::compute(HashAlgorithm::Sha256, b"oracle"),
                allowed_node_key_origins: HashSet::new(),
                content_max_size: 3_500_000,
                mining_timeout_secs: 1,
                network_seed: b"seed".to_vec(),
            },
            "2024-01-01T00:00:00Z".parse().unwrap(),
        );

        let (mut client, server) = duplex(4096);
        let now: DateTime<Utc> = "2024-01-01T00:00:00Z".parse().unwrap();

        let server_task = tokio::spawn(async move {
            let collaborators = context.collaborators();
            run_connection(server, &collaborators, || now).await
        });

        let request = ambernet_codec::encode(&Frame::Ping).unwrap();
        client.write_u32(request.len() as u32).await.unwrap();
        client.write_all(&request).await.unwrap();

        let mut len_buf = [0u8; 4];
        client.read_exact(&mut len_buf).await.unwrap();
        let mut response_buf = vec![0u8; u32::from_be_bytes(len_buf) as usize];
        client.read_exact(&mut response_buf).await.unwrap();
        let (response, _) = ambernet_codec::decode(&response_buf).unwrap();
        assert_eq!(response, Frame::Ok);

        drop(client);
        server_task.await.unwrap().unwrap();
    }
}
