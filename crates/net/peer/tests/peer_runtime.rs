//! Runtime tests against real in-process peers on loopback.

use std::{
    net::{IpAddr, Ipv4Addr},
    time::Duration,
};

use bytes::Bytes;
use libp2p::{Multiaddr, multiaddr::Protocol};
use siege_identity::IdentityFactory;
use siege_net_peer::{BootstrapConfig, JoinOutcome, PeerConfig, PeerError, PeerHandle, spawn_peer};
use siege_topics::TopicName;

fn loopback_config() -> PeerConfig {
    PeerConfig::default().with_host(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

fn start(index: usize) -> PeerHandle {
    let identity = IdentityFactory::default().identity_for(index).unwrap();
    spawn_peer(index, identity, &loopback_config()).unwrap()
}

async fn dialable_addr(peer: &PeerHandle) -> Multiaddr {
    for _ in 0..250 {
        let status = peer.status().await.unwrap();
        if let Some(addr) = status.listen_addrs.first() {
            return addr.clone().with(Protocol::P2p(peer.peer_id()));
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("peer never reported a listen address");
}

#[tokio::test]
async fn bootstraps_against_a_live_peer() {
    let seed = start(0);
    let addr = dialable_addr(&seed).await;

    let peer = start(1);
    assert!(!peer.is_bootstrapped());

    let config = BootstrapConfig::new(vec![addr.clone()])
        .with_retries(3)
        .with_retry_delay(Duration::from_millis(100))
        .with_timeout(Duration::from_secs(10));
    let connected = siege_net_peer::bootstrap(&peer, &config).await.unwrap();

    assert_eq!(connected, addr);
    assert!(peer.is_bootstrapped());

    let status = peer.status().await.unwrap();
    assert!(status.bootstrapped);
    assert_eq!(status.peer_id, peer.peer_id());
    assert!(!status.remote_addrs.is_empty());

    peer.close().await;
    seed.close().await;
}

#[tokio::test]
async fn bootstrap_without_bootnodes_fails() {
    let peer = start(0);
    let result = siege_net_peer::bootstrap(&peer, &BootstrapConfig::default()).await;
    assert!(matches!(result, Err(PeerError::NoBootnodes)));
    assert!(!peer.is_bootstrapped());
}

#[tokio::test]
async fn unreachable_bootnodes_fail_after_retries() {
    let peer = start(0);
    let dead: Multiaddr = "/ip4/127.0.0.1/tcp/1".parse().unwrap();
    let config = BootstrapConfig::new(vec![dead])
        .with_retries(2)
        .with_retry_delay(Duration::from_millis(10))
        .with_timeout(Duration::from_secs(10));

    let result = siege_net_peer::bootstrap(&peer, &config).await;
    assert!(
        matches!(
            result,
            Err(PeerError::BootstrapFailed(_)) | Err(PeerError::BootstrapTimeout(_))
        ),
        "unexpected result: {result:?}"
    );
    assert!(!peer.is_bootstrapped());
}

#[tokio::test]
async fn topic_join_is_idempotent() {
    let peer = start(0);
    let topic = TopicName::from("transactions_0");

    assert_eq!(peer.join_topic(&topic).await.unwrap(), JoinOutcome::Joined);
    assert_eq!(
        peer.join_topic(&topic).await.unwrap(),
        JoinOutcome::AlreadyJoined
    );

    let status = peer.status().await.unwrap();
    assert_eq!(status.topics.len(), 1);
    assert_eq!(status.topics[0].topic, topic);
}

#[tokio::test]
async fn publish_requires_a_joined_topic() {
    let peer = start(0);
    let topic = TopicName::from("transactions_0_1");
    let result = peer.publish(&topic, Bytes::from_static(b"x")).await;
    assert!(matches!(result, Err(PeerError::NotJoined(t)) if t == topic));
}

#[tokio::test]
async fn closed_peer_rejects_requests() {
    let peer = start(0);
    peer.close().await;
    assert!(matches!(peer.status().await, Err(PeerError::Closed)));
}
