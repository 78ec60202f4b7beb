//! Host build of the firmware: simulated radios behind a stdin/stdout console.

use radiowire::ble::sim::SimulatedLink;
use radiowire::engine::sim::SimulatedMac;
use radiowire::{logging, Config, Firmware, WorkPendingSignal};
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    logging::init(&config.logging.filter)?;

    let mac_irq = WorkPendingSignal::new();
    let ble_irq = WorkPendingSignal::new();
    let mac = SimulatedMac::with_params(mac_irq.clone(), config.lorawan.engine_params());
    let link = SimulatedLink::new(ble_irq.clone());

    let firmware = Firmware::builder()
        .lorawan(mac, mac_irq)
        .ble(link, ble_irq)
        .config(config)
        .start(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;

    firmware.wait_for_console().await?;
    Ok(())
}
