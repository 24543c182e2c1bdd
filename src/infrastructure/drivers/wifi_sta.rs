use core::str::FromStr;

use embassy_executor::Spawner;
use embassy_net::{DhcpConfig, Runner, Stack, StackResources};
use embassy_time::{Duration, Timer};
use esp_hal::peripherals::WIFI;
use esp_radio::wifi::{
    AuthMethod,
    ClientConfig,
    Config,
    ModeConfig,
    WifiController,
    WifiDevice,
    WifiEvent,
    WifiStaState,
};
use heapless::String;
use log::{info, warn};
use static_cell::make_static;

use super::random::get_seed;
use crate::config::{DEVICE, WIFI};

/// Maximum length of the hostname
const MAX_HOSTNAME_LEN: usize = 32;

const MAX_NETWORK_CONNECTIONS: usize = 6;

#[derive(Debug)]
pub enum WifiError {
    Init,
    Hostname,
    Spawn,
}

/// Start the Wi-Fi STA (Station) mode
///
/// It connects to the `WiFi` network and waits until an address is leased.
/// If the connection is lost, it tries to reconnect.
pub async fn start_wifi_sta(
    spawner: Spawner,
    wifi_device: WIFI<'static>,
) -> Result<Stack<'static>, WifiError> {
    let esp_radio_ctrl = &*make_static!(esp_radio::init().map_err(|_| WifiError::Init)?);
    let (controller, interfaces) =
        esp_radio::wifi::new(esp_radio_ctrl, wifi_device, Config::default())
            .map_err(|_| WifiError::Init)?;

    let mut dhcp_config = DhcpConfig::default();
    let hostname = String::<MAX_HOSTNAME_LEN>::from_str(DEVICE.hostname)
        .map_err(|()| WifiError::Hostname)?;
    dhcp_config.hostname = Some(hostname);
    let net_config = embassy_net::Config::dhcpv4(dhcp_config);

    let network_resources = make_static!(StackResources::<{ MAX_NETWORK_CONNECTIONS }>::new());
    let (stack, runner) =
        embassy_net::new(interfaces.sta, net_config, network_resources, get_seed());

    spawner
        .spawn(wifi_connection_task(controller))
        .map_err(|_| WifiError::Spawn)?;
    spawner
        .spawn(network_runner_task(runner))
        .map_err(|_| WifiError::Spawn)?;

    let config = wait_for_connection(stack).await;
    info!("network: got address {}", config.address);

    Ok(stack)
}

/// Background task for connecting to the `WiFi` network and reconnecting if needed
#[embassy_executor::task]
async fn wifi_connection_task(mut controller: WifiController<'static>) {
    loop {
        // Wait until we're no longer connected
        if esp_radio::wifi::sta_state() == WifiStaState::Connected {
            controller.wait_for_event(WifiEvent::StaDisconnected).await;
            Timer::after(Duration::from_millis(2000)).await;
        }
        if !matches!(controller.is_started(), Ok(true)) {
            let client_config = if WIFI.password.is_empty() {
                ClientConfig::default()
                    .with_ssid(WIFI.ssid.into())
                    .with_auth_method(AuthMethod::None)
            } else {
                ClientConfig::default()
                    .with_ssid(WIFI.ssid.into())
                    .with_password(WIFI.password.into())
            };
            let mode_config = ModeConfig::Client(client_config);
            if let Err(err) = controller.set_config(&mode_config) {
                warn!("network: invalid client config: {:?}", err);
                Timer::after(Duration::from_millis(5000)).await;
                continue;
            }
            if let Err(err) = controller.start_async().await {
                warn!("network: failed to start: {:?}", err);
                Timer::after(Duration::from_millis(5000)).await;
                continue;
            }
        }

        info!("network: connecting to {}", WIFI.ssid);
        if let Err(err) = controller.connect_async().await {
            warn!("network: error connecting: {:?}", err);
            Timer::after(Duration::from_millis(5000)).await;
        }
    }
}

/// Background task for running the network stack
#[embassy_executor::task]
async fn network_runner_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await;
}

/// Wait for full network connectivity (link + IP address)
/// Returns the obtained IPv4 configuration
async fn wait_for_connection(stack: Stack<'_>) -> embassy_net::StaticConfigV4 {
    // Wait for the network link to become active
    loop {
        if stack.is_link_up() {
            break;
        }
        Timer::after(Duration::from_millis(100)).await;
    }

    // Wait for the network stack to obtain an IPv4 address via DHCP
    loop {
        if let Some(config) = stack.config_v4() {
            return config;
        }
        Timer::after(Duration::from_millis(100)).await;
    }
}
