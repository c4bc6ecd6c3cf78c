//! List every platform (backend) and the devices it exposes.

use kernbench::gpu::device::{default_backends, enumerate};
use kernbench::Error;

fn main() {
    env_logger::init();

    let platforms = enumerate(default_backends());
    if platforms.is_empty() {
        kernbench::exit_with(&Error::NoAdapter {
            kind: "compute".to_string(),
        });
    }

    for platform in &platforms {
        println!("Platform Name: {}", platform.name());

        for device in &platform.devices {
            println!("  Device Name: {}", device.name);
            log::debug!(
                "{}: {:?}, vendor {:#06x}, device {:#06x}, driver {}",
                device.name,
                device.device_type,
                device.vendor,
                device.device,
                device.driver
            );
        }
    }
}
