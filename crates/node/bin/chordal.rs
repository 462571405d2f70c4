use std::sync::Arc;

use chordal_node::chordal_core::dht::Address;
use chordal_node::chordal_rpc::Client;
use chordal_node::config;
use chordal_node::endpoint::run_http_api;
use chordal_node::error::Error;
use chordal_node::logging::init_logging;
use chordal_node::logging::LogLevel;
use chordal_node::processor::ProcessorBuilder;
use clap::Args;
use clap::Parser;
use clap::Subcommand;

#[derive(Parser, Debug)]
#[command(about, version, author)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(long, default_value_t = LogLevel::Info, value_enum, env)]
    log_level: LogLevel,
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "kebab-case")]
enum Command {
    #[command(about = "Writes a default configuration file.")]
    Init(InitCommand),
    #[command(about = "Starts a long-running peer.")]
    Run(RunCommand),
    #[command(about = "Finds the peer responsible for a value and shows its metadata.")]
    Lookup(LookupCommand),
    #[command(
        about = "Show ring state of a peer. Include successor, predecessor, successor list and finger table."
    )]
    Inspect(InspectCommand),
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[arg(
        long,
        short = 'c',
        env,
        default_value = config::DEFAULT_CONFIG_LOCATION,
        help = "Config file location"
    )]
    pub config: String,
}

#[derive(Args, Debug)]
struct InitCommand {
    #[arg(
        long,
        default_value = config::DEFAULT_CONFIG_LOCATION,
        help = "The location of config file"
    )]
    pub location: String,

    #[arg(long, default_value = config::DEFAULT_HOST, help = "Advertised host")]
    pub host: String,

    #[arg(long, default_value_t = config::DEFAULT_PORT, help = "Advertised port")]
    pub port: u16,

    #[arg(
        long = "well-known-peer",
        short = 'w',
        value_parser = parse_address,
        help = "Bootstrap contact as host:port, can be repeated"
    )]
    pub well_known_peers: Vec<Address>,
}

#[derive(Args, Debug)]
struct RunCommand {
    #[arg(
        long,
        short = 'b',
        help = "Listen address. If not provided, use bind_addr in config file or 0.0.0.0:<port>",
        env
    )]
    pub bind_addr: Option<String>,

    #[arg(long, help = "Advertised host. If not provided, use host in config file", env)]
    pub host: Option<String>,

    #[arg(long, help = "Advertised port. If not provided, use port in config file", env)]
    pub port: Option<u16>,

    #[arg(
        long,
        help = "Base interval of the periodic tasks in seconds. If not provided, use service_interval in config file or 30",
        env
    )]
    pub service_interval: Option<u64>,

    #[arg(
        long = "well-known-peer",
        short = 'w',
        value_parser = parse_address,
        help = "Bootstrap contact as host:port, added to well_known_peers in config file"
    )]
    pub well_known_peers: Vec<Address>,

    #[command(flatten)]
    config_args: ConfigArgs,
}

#[derive(Args, Debug)]
struct ClientArgs {
    #[arg(
        long,
        short = 'p',
        value_parser = parse_address,
        help = "Peer to ask, as host:port. If not provided, use host and port in config file",
        env
    )]
    peer: Option<Address>,

    #[command(flatten)]
    config_args: ConfigArgs,
}

impl ClientArgs {
    fn new_client(&self) -> anyhow::Result<(Client, Address)> {
        let c = config::Config::read_fs(self.config_args.config.as_str())?;
        let peer = match &self.peer {
            Some(peer) => peer.clone(),
            None => Address::new(c.host.clone(), c.port)?,
        };
        let client = Client::new(c.protocol, c.request_timeout())?;
        Ok((client, peer))
    }
}

#[derive(Args, Debug)]
struct LookupCommand {
    #[command(flatten)]
    client_args: ClientArgs,

    #[arg(help = "Any string, hashed to a ring identifier")]
    value: String,
}

#[derive(Args, Debug)]
struct InspectCommand {
    #[command(flatten)]
    client_args: ClientArgs,
}

fn parse_address(s: &str) -> Result<Address, Error> {
    let (host, port) = s
        .rsplit_once(':')
        .ok_or_else(|| Error::InvalidPeerAddr(s.to_string()))?;
    let port = port
        .parse()
        .map_err(|_| Error::InvalidPeerAddr(s.to_string()))?;
    Ok(Address::new(host, port)?)
}

fn get_value<V>(value: Option<V>, default_value: V) -> V {
    value.unwrap_or(default_value)
}

async fn daemon_run(args: RunCommand) -> anyhow::Result<()> {
    let mut c = config::Config::read_fs(args.config_args.config.as_str())?;

    c.host = get_value(args.host, c.host);
    c.port = get_value(args.port, c.port);
    c.service_interval = get_value(args.service_interval, c.service_interval);
    if args.bind_addr.is_some() {
        c.bind_addr = args.bind_addr;
    }
    c.well_known_peers.extend(args.well_known_peers);

    let bind_addr = c.bind_addr()?;
    let processor = Arc::new(ProcessorBuilder::from_config(&c).build()?);
    println!("Did: {}", processor.did());

    let (_, served) = futures::join!(
        processor.listen(),
        run_http_api(bind_addr, processor.clone()),
    );
    served
}

fn display<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    match cli.command {
        Command::Init(args) => {
            let mut c = config::Config::new(args.host, args.port);
            c.well_known_peers = args.well_known_peers;
            let p = c.write_fs(args.location.as_str())?;
            println!("Your config file has saved to: {}", p);
            Ok(())
        }
        Command::Run(args) => daemon_run(args).await,
        Command::Lookup(args) => {
            let (client, peer) = args.client_args.new_client()?;
            display(&client.lookup(&peer, args.value.as_str()).await?)
        }
        Command::Inspect(args) => {
            let (client, peer) = args.client_args.new_client()?;
            display(&client.inspect(&peer).await?)
        }
    }
}
