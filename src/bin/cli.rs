//! ventsim CLI Client
//!
//! Command-line interface for poking registers on the simulator or a real
//! unit.

use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use ventsim::network::Client;
use ventsim::registers::{Quantity, RegisterMap};
use ventsim::simulation::CONTROL_ARMED;
use ventsim::Result;

/// ventsim CLI
#[derive(Parser, Debug)]
#[command(name = "ventsim-cli")]
#[command(about = "Modbus-TCP client for the ventilation unit")]
struct Args {
    /// Device address
    #[arg(short, long, default_value = "127.0.0.1:502")]
    server: String,

    /// Modbus unit id
    #[arg(short, long, default_value = "1")]
    unit: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Read holding registers
    Read {
        /// First register address
        start: u16,

        /// Number of registers
        #[arg(default_value = "1")]
        count: u16,
    },

    /// Write a single register
    Write {
        /// Register address
        address: u16,

        /// Raw value
        value: u16,
    },

    /// Write consecutive registers
    WriteMulti {
        /// First register address
        start: u16,

        /// Raw values
        #[arg(required = true)]
        values: Vec<u16>,
    },

    /// Arm a quantity and stage its new target (two-phase write)
    Command {
        quantity: QuantityArg,

        /// Raw target value (temperature in 0.1 °C)
        value: u16,
    },

    /// Show the reported values of every quantity
    Status,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum QuantityArg {
    Power,
    Mode,
    Temperature,
}

impl From<QuantityArg> for Quantity {
    fn from(arg: QuantityArg) -> Self {
        match arg {
            QuantityArg::Power => Quantity::Power,
            QuantityArg::Mode => Quantity::Mode,
            QuantityArg::Temperature => Quantity::Temperature,
        }
    }
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut client = Client::connect(&args.server)?.with_unit_id(args.unit);
    client.set_timeout(Some(Duration::from_secs(5)))?;

    let map = RegisterMap::atrea_rd5();

    match args.command {
        Commands::Read { start, count } => {
            let values = client.read_holding_registers(start, count)?;
            for (offset, value) in values.iter().enumerate() {
                println!("{}: {}", start.wrapping_add(offset as u16), value);
            }
        }
        Commands::Write { address, value } => {
            let (address, value) = client.write_single_register(address, value)?;
            println!("{}: {}", address, value);
        }
        Commands::WriteMulti { start, values } => {
            let (start, count) = client.write_multiple_registers(start, &values)?;
            println!("wrote {} registers from {}", count, start);
        }
        Commands::Command { quantity, value } => {
            let quantity = Quantity::from(quantity);
            let Some(triple) = map.triple(quantity) else {
                println!("{} is not controllable", quantity.name());
                return Ok(());
            };
            client.write_single_register(triple.control, CONTROL_ARMED)?;
            client.write_single_register(triple.target, value)?;
            println!("{} -> {} staged", quantity.name(), quantity.format(value));
        }
        Commands::Status => {
            for triple in map.triples() {
                let value = client.read_holding_registers(triple.reported, 1)?[0];
                println!("{}: {}", triple.quantity.name(), triple.quantity.format(value));
            }
            if let Some(outdoor) = map.outdoor() {
                let value = client.read_holding_registers(outdoor, 1)?[0];
                println!("Outdoor: {}", Quantity::Temperature.format(value));
            }
            if let Some(supply) = map.supply() {
                let value = client.read_holding_registers(supply.address, 1)?[0];
                println!("Supply: {}", Quantity::Temperature.format(value));
            }
        }
    }

    Ok(())
}
