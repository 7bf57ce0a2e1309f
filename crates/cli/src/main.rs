// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Entry point: loads configuration, wires the in-memory collaborator
//! stores and the signing keystore, and serves the authorization
//! endpoint.

mod clients;
mod server;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "mas-cli", about = "Authorization server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the authorization server.
    Server {
        /// Path to the YAML configuration file.
        #[arg(short, long)]
        config: Option<Utf8PathBuf>,

        /// Path to a YAML file listing the clients this server knows
        /// about. Client registration itself is out of scope; this just
        /// seeds the static lookup table at startup.
        #[arg(long)]
        clients: Option<Utf8PathBuf>,
    },

    /// Load the configuration and print it back out, to sanity-check a
    /// YAML file and its environment overlay before `server` uses it.
    ConfigCheck {
        #[arg(short, long)]
        config: Option<Utf8PathBuf>,
    },
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Server { config, clients } => {
            let config = mas_config::Config::load(config.as_ref())?;
            let clients = clients
                .map(|path| self::clients::load(&path))
                .transpose()?
                .unwrap_or_default();
            server::run(config, clients).await
        }
        Commands::ConfigCheck { config } => {
            let config = mas_config::Config::load(config.as_ref())?;
            println!("{}", serde_yaml::to_string(&config)?);
            Ok(())
        }
    }
}
