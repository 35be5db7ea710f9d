//! Bridge a local "firmware" socket to an in-process bus.
//!
//! Run with: cargo run -p synbridge --example loopback-bridge

use std::net::UdpSocket;
use std::sync::Arc;
use std::time::Duration;

use synbridge::bridge::Callback;
use synbridge::frame::{Frame, UPTIME};
use synbridge::msgs::Joy;
use synbridge::{Bridge, BridgeConfig, Bus, BusMessage, LocalBus};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let firmware = UdpSocket::bind("127.0.0.1:0")?;
    firmware.set_read_timeout(Some(Duration::from_secs(2)))?;

    let bus = Arc::new(LocalBus::new());
    let print: Callback = Arc::new(|message: &BusMessage| println!("bus <- {message:?}"));
    bus.subscribe("out/uptime", print.clone());
    bus.subscribe("out/clock_offset", print);

    let config = BridgeConfig {
        local_addr: "127.0.0.1:0".to_string(),
        recv_timeout: Duration::from_millis(200),
        ..BridgeConfig::new("127.0.0.1", firmware.local_addr()?.port())
    };
    let mut bridge = Bridge::new(config, bus.clone());
    bridge.start()?;
    let bridge_addr = bridge.link().map(|link| link.local_addr()).ok_or("not running")?;

    // 42 seconds of remote uptime, protobuf-encoded by hand: field 1, varint 42.
    let uptime = Frame::new(UPTIME, vec![0x08, 42]).to_datagram()?;
    firmware.send_to(&uptime, bridge_addr)?;

    bus.publish(
        "in/joy",
        BusMessage::Joy(Joy {
            axes: vec![0.0, 1.0],
            buttons: vec![0, 1],
        }),
    );
    let mut buf = [0u8; 512];
    let n = firmware.recv(&mut buf)?;
    println!("firmware <- {n} byte datagram");

    std::thread::sleep(Duration::from_millis(300));
    println!("stats: {:?}", bridge.stats());
    bridge.shutdown()?;
    Ok(())
}
