use clap::{Parser, Subcommand, ValueEnum};
use hnap_lib::soap::SoapValue;
use hnap_lib::{HnapSession, RadioId};
use std::error::Error;

#[derive(Parser)]
#[command(name = "hnap-cli", about = "Query and manage HNAP1 routers")]
struct Cli {
    /// Device address (host or host:port)
    #[arg(short, long)]
    address: String,

    /// Admin account name
    #[arg(short, long, default_value = "Admin")]
    username: String,

    /// Admin password
    #[arg(short, long, default_value = "")]
    password: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show general device settings
    DeviceSettings,
    /// Show WAN settings
    WanSettings,
    /// Show wireless settings for one radio band
    RadioSettings {
        #[arg(value_enum, default_value = "2.4")]
        band: Band,
    },
    /// List connected clients
    Clients,
    /// Reboot the device
    Reboot,
}

#[derive(Clone, Copy, ValueEnum)]
enum Band {
    #[value(name = "2.4")]
    Band24,
    #[value(name = "5")]
    Band5,
}

impl From<Band> for RadioId {
    fn from(band: Band) -> Self {
        match band {
            Band::Band24 => RadioId::Band24GHz,
            Band::Band5 => RadioId::Band5GHz,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let mut session = HnapSession::new(&cli.address, &cli.username, &cli.password)?;
    session.login().await?;
    println!("Authenticated to {}", cli.address);

    let response = match cli.command {
        Command::DeviceSettings => session.get_device_settings().await?,
        Command::WanSettings => session.get_wan_settings().await?,
        Command::RadioSettings { band } => session.get_wlan_radio_settings(band.into()).await?,
        Command::Clients => session.get_client_info().await?,
        Command::Reboot => session.reboot().await?,
    };

    println!("{}:", response.root);
    print_value(&response.fields, 1);

    Ok(())
}

/// Print a decoded response tree with two-space indentation per level.
fn print_value(value: &SoapValue, depth: usize) {
    let pad = "  ".repeat(depth);
    match value {
        SoapValue::Text(text) => println!("{pad}{text}"),
        SoapValue::Map(map) => {
            for (name, child) in map {
                match child {
                    SoapValue::Text(text) => println!("{pad}{name}: {text}"),
                    _ => {
                        println!("{pad}{name}:");
                        print_value(child, depth + 1);
                    }
                }
            }
        }
        SoapValue::List(items) => {
            for item in items {
                match item {
                    SoapValue::Text(text) => println!("{pad}- {text}"),
                    _ => {
                        println!("{pad}-");
                        print_value(item, depth + 1);
                    }
                }
            }
        }
    }
}
