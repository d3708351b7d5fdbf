use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, TxHash};
use alloy::rpc::types::TransactionRequest;
use clap::{Parser, Subcommand, ValueEnum};

use crosspay::blockchain::{chains, erc20, Erc20Token};
use crosspay::config::{load_or_default, CONFIG_PATH_ENV_VAR};
use crosspay::lifecycle::{bootstrap, CrossPayApp};
use crosspay::observability::logging;
use crosspay::payments::{qr, uri, ConfirmationWatcher, PaymentError, ReceiptSource, SubmitError, TxStatus};
use crosspay::wallet::{Account, ConnectorKind};

#[derive(Parser)]
#[command(name = "crosspay-cli")]
#[command(about = "Send and receive payments on Base", long_about = None)]
struct Cli {
    /// Config file (defaults to $CROSSPAY_CONFIG, then built-in defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured wallet connectors
    Connectors,
    /// Connect a wallet and show the account
    Connect {
        /// Connector id (farcasterFrame, injected, coinbaseWalletSDK, walletConnect)
        #[arg(long)]
        connector: Option<ConnectorKind>,
    },
    /// Send native tokens and wait for confirmation
    Pay {
        #[arg(long)]
        to: String,
        /// Decimal amount, e.g. 0.01
        #[arg(long)]
        amount: String,
        #[arg(long)]
        connector: Option<ConnectorKind>,
        /// Return after submission without waiting for the receipt
        #[arg(long)]
        no_wait: bool,
    },
    /// Show a payment QR code for an address
    Receive {
        #[arg(long)]
        address: String,
        #[arg(long)]
        amount: Option<String>,
        #[arg(long)]
        chain_id: Option<u64>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Terminal)]
        format: OutputFormat,
        /// Write the QR to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Follow a transaction until it is mined
    Watch {
        hash: TxHash,
        #[arg(long)]
        chain_id: Option<u64>,
    },
    /// Native or ERC-20 balance of an address
    Balance {
        address: Address,
        /// ERC-20 contract; native balance when omitted
        #[arg(long)]
        token: Option<Address>,
    },
    /// Send ERC-20 tokens through the connected wallet
    TokenTransfer {
        #[arg(long)]
        token: Address,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: String,
        #[arg(long)]
        connector: Option<ConnectorKind>,
    },
    /// Let `spender` move ERC-20 tokens on behalf of the connected wallet
    TokenApprove {
        #[arg(long)]
        token: Address,
        #[arg(long)]
        spender: Address,
        #[arg(long)]
        amount: String,
        #[arg(long)]
        connector: Option<ConnectorKind>,
    },
    /// ERC-20 allowance granted by `owner` to `spender`
    Allowance {
        #[arg(long)]
        token: Address,
        #[arg(long)]
        owner: Address,
        #[arg(long)]
        spender: Address,
    },
    /// ERC-20 name, symbol and decimals
    TokenInfo { token: Address },
    /// Switch the connected wallet to another supported network
    SwitchChain {
        chain_id: u64,
        #[arg(long)]
        connector: Option<ConnectorKind>,
    },
    /// List supported networks
    Chains,
    /// Merchant programme details
    Merchant,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Terminal,
    Svg,
    Png,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .or_else(|| std::env::var(CONFIG_PATH_ENV_VAR).ok().map(PathBuf::from));
    let config = load_or_default(config_path.as_deref())?;
    logging::init_logging(&config.observability);

    match cli.command {
        Commands::Chains => {
            for chain in chains::SUPPORTED_CHAINS.iter() {
                let marker = if chain.id == config.chain.chain_id { "*" } else { " " };
                println!("{} {} {:<14} {:>6}  {}", marker, chain.icon, chain.name, chain.id, chain.explorer_url);
            }
        }
        Commands::Merchant => print_merchant_panel(),
        Commands::Receive {
            address,
            amount,
            chain_id,
            format,
            out,
        } => {
            crosspay::payments::draft::validate_address(&address)?;
            let chain_id = chain_id.unwrap_or(config.chain.chain_id);
            let payment_uri = uri::build_payment_uri(&address, chain_id, amount.as_deref())?;
            println!("{}", payment_uri);

            let options = match format {
                OutputFormat::Terminal => qr::QrOptions::terminal(),
                OutputFormat::Svg => qr::QrOptions::svg(),
                OutputFormat::Png => qr::QrOptions::png(512),
            };
            let rendered = qr::render(&payment_uri, &options)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, rendered)?;
                    println!("QR written to {}", path.display());
                }
                None if matches!(format, OutputFormat::Png) => {
                    return Err("PNG output needs --out".into());
                }
                None => println!("{}", String::from_utf8_lossy(&rendered)),
            }
        }
        command => {
            let app = bootstrap(config).await?;
            run_with_app(&app, command).await?;
        }
    }

    Ok(())
}

async fn run_with_app(app: &CrossPayApp, command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Connectors => {
            let connectors = app.session.connectors();
            if connectors.is_empty() {
                println!("No wallet connectors configured");
            }
            let default = app.session.default_connector();
            for kind in connectors {
                let marker = if Some(kind) == default { "*" } else { " " };
                println!("{} {:<18} {}", marker, kind.id(), kind.name());
            }
        }
        Commands::Connect { connector } => {
            let account = connect(app, connector).await?;
            print_account(app, &account);
        }
        Commands::Pay {
            to,
            amount,
            connector,
            no_wait,
        } => {
            if !app.frame.is_in_frame() {
                connect(app, connector).await?;
            }
            app.flow.set_recipient(to).await;
            app.flow.set_amount(amount).await;

            let record = match app.flow.submit().await {
                Ok(record) => record,
                Err(e) => return Err(describe_submit_error(&e).into()),
            };
            println!("Payment sent! Waiting for confirmation...");
            println!("  hash: {}", record.hash);
            if no_wait {
                return Ok(());
            }
            report(app.flow.wait_for_terminal().await)?;
        }
        Commands::Watch { hash, chain_id } => {
            let chain_id = chain_id.unwrap_or(app.config.chain.chain_id);
            let watcher = ConfirmationWatcher::new(
                app.clients.clone() as Arc<dyn ReceiptSource>,
                chain_id,
                Duration::from_millis(app.config.chain.poll_interval_ms),
                app.config.chain.receipt_retry_limit,
            );
            let status = watcher
                .watch(hash, |status| println!("  {}", status.label()))
                .await;
            report(Some(status))?;
        }
        Commands::Balance { address, token } => match token {
            None => {
                let wei = app.client.get_balance(address).await?;
                let symbol = chains::chain_or_default(app.config.chain.chain_id).native_symbol;
                println!("{} {}", erc20::format_amount(wei, 18)?, symbol);
            }
            Some(token) => {
                let token = Erc20Token::new(token, (*app.client).clone());
                let balance = token.balance(address).await?;
                println!("{} {}", balance.formatted()?, balance.symbol);
            }
        },
        Commands::TokenTransfer {
            token,
            to,
            amount,
            connector,
        } => {
            let to = crosspay::payments::draft::validate_address(&to)?;
            connect(app, connector).await?;
            let token = Erc20Token::new(token, (*app.client).clone());
            let tx = token.transfer_request(to, &amount, None).await?;
            let hash = send(app, tx).await?;
            println!("Transfer sent: {}", hash);
            println!("  {}", chains::explorer_tx_url(app.config.chain.chain_id, &hash));
        }
        Commands::TokenApprove {
            token,
            spender,
            amount,
            connector,
        } => {
            connect(app, connector).await?;
            let token = Erc20Token::new(token, (*app.client).clone());
            let tx = token.approve_request(spender, &amount, None).await?;
            let hash = send(app, tx).await?;
            println!("Approval sent: {}", hash);
            println!("  {}", chains::explorer_tx_url(app.config.chain.chain_id, &hash));
        }
        Commands::Allowance {
            token,
            owner,
            spender,
        } => {
            let token = Erc20Token::new(token, (*app.client).clone());
            let raw = token.allowance(owner, spender).await?;
            let decimals = token.decimals().await?;
            let symbol = token.symbol().await?;
            println!("{} {}", erc20::format_amount(raw, decimals)?, symbol);
        }
        Commands::TokenInfo { token } => {
            let token = Erc20Token::new(token, (*app.client).clone());
            println!("{}", token.address());
            println!("  name:     {}", token.name().await?);
            println!("  symbol:   {}", token.symbol().await?);
            println!("  decimals: {}", token.decimals().await?);
        }
        Commands::SwitchChain { chain_id, connector } => {
            connect(app, connector).await?;
            app.session.switch_chain(chain_id).await?;
            let chain = chains::chain_or_default(chain_id);
            println!("Switched to {} {}", chain.icon, chain.name);
        }
        Commands::Chains | Commands::Merchant | Commands::Receive { .. } => {}
    }
    Ok(())
}

async fn connect(app: &CrossPayApp, connector: Option<ConnectorKind>) -> Result<Account, Box<dyn std::error::Error>> {
    let account = match connector {
        Some(kind) => app.session.connect(kind).await?,
        None => app.session.connect_default().await?,
    };
    Ok(account)
}

async fn send(app: &CrossPayApp, tx: TransactionRequest) -> Result<TxHash, String> {
    app.session
        .send_transaction(tx)
        .await
        .map_err(|e| describe_submit_error(&SubmitError::from(e)))
}

fn print_account(app: &CrossPayApp, account: &Account) {
    let chain = chains::chain_or_default(account.chain_id);
    println!("Connected: {}", account.address);
    println!("  network: {} {} ({})", chain.icon, chain.name, account.chain_id);
    println!(
        "  explorer: {}",
        chains::explorer_address_url(account.chain_id, &account.address.to_string())
    );
    let user = app.frame.user();
    if let Some(name) = user.display_name.or(user.username) {
        println!("  frame user: {}", name);
    }
}

fn describe_submit_error(error: &SubmitError) -> String {
    match error {
        SubmitError::Payment(PaymentError::ContractRevert { reason }) => {
            format!("Transaction failed: {}", reason)
        }
        SubmitError::Payment(e) if !e.is_recoverable() => format!("{} [{}]", e, e.code()),
        other => format!("Payment failed: {} [{}]", other, other.code()),
    }
}

fn report(status: Option<TxStatus>) -> Result<(), Box<dyn std::error::Error>> {
    match status {
        Some(TxStatus::Success {
            block_number,
            explorer_url,
        }) => {
            match block_number {
                Some(block) => println!("Transaction confirmed in block {}", block),
                None => println!("Transaction confirmed"),
            }
            println!("  {}", explorer_url);
            Ok(())
        }
        Some(TxStatus::Error { message }) => Err(format!("Transaction failed: {}", message).into()),
        Some(other) => Err(format!("Watch ended while {}", other.label()).into()),
        None => Err("Transaction is no longer tracked".into()),
    }
}

fn print_merchant_panel() {
    println!("Become a Merchant");
    println!("Accept crypto payments with QR codes. Only 1% platform fee.");
    for feature in [
        "Instant settlements",
        "QR code generation",
        "Real-time dashboard",
        "Multi-wallet support",
    ] {
        println!("  ✓ {}", feature);
    }
}
