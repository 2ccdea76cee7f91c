//! Wire encoding for the `Node` record, shared by `BootstrappingNodes` and
//! `NodeList` responses.

use ambernet_tx::node::Transport;
use ambernet_tx::Node;
use chrono::{DateTime, TimeZone, Utc};

use crate::cursor::{Reader, Writer};
use crate::Error;

pub fn encode_node(w: &mut Writer, node: &Node) {
    w.tagged_key(&node.first_public_key);
    w.tagged_key(&node.last_public_key);
    w.raw(&node.ip.octets());
    w.u16(node.port);
    w.u16(node.http_port);
    w.u8(match node.transport {
        Transport::Tcp => 0,
    });
    w.tagged_hash(&node.reward_address);
    w.raw(&node.network_patch);
    w.tagged_key(&node.origin_public_key);
    w.u16(node.certificate.len() as u16);
    w.raw(&node.certificate);
    w.u8(node.available as u8);
    w.u8(node.authorized as u8);
    match node.authorization_date {
        Some(date) => {
            w.u8(1);
            w.u32(date.timestamp() as u32);
        }
        None => {
            w.u8(0);
        }
    }
    w.raw(&node.geo_patch);
}

pub fn decode_node<'a>(r: &mut Reader<'a>) -> Result<Node, Error> {
    let first_public_key = r.tagged_key()?;
    let last_public_key = r.tagged_key()?;
    let ip_bytes = r.bytes(4, "node.ip")?;
    let ip = std::net::Ipv4Addr::new(ip_bytes[0], ip_bytes[1], ip_bytes[2], ip_bytes[3]);
    let port = r.u16("node.port")?;
    let http_port = r.u16("node.http_port")?;
    let transport = match r.u8("node.transport")? {
        0 => Transport::Tcp,
        other => return Err(Error::Malformed(format!("unknown transport tag {other}"))),
    };
    let reward_address = r.tagged_hash()?;
    let network_patch = r.bytes(3, "node.network_patch")?;
    let network_patch = [network_patch[0], network_patch[1], network_patch[2]];
    let origin_public_key = r.tagged_key()?;
    let cert_len = r.u16("node.certificate.len")? as usize;
    let certificate = r.bytes(cert_len, "node.certificate")?.to_vec();
    let available = r.u8("node.available")? != 0;
    let authorized = r.u8("node.authorized")? != 0;
    let authorization_date = match r.u8("node.authorization_date.present")? {
        0 => None,
        _ => {
            let ts = r.u32("node.authorization_date")?;
            Some(timestamp_to_utc(ts))
        }
    };
    let geo_patch = r.bytes(3, "node.geo_patch")?;
    let geo_patch = [geo_patch[0], geo_patch[1], geo_patch[2]];

    Ok(Node {
        first_public_key,
        last_public_key,
        ip,
        port,
        http_port,
        transport,
        reward_address,
        network_patch,
        origin_public_key,
        certificate,
        available,
        authorized,
        authorization_date,
        geo_patch,
    })
}

fn timestamp_to_utc(ts: u32) -> DateTime<Utc> {
    Utc.timestamp_opt(ts as i64, 0)
        .single()
        .expect("u32 unix timestamps are always in range")
}
