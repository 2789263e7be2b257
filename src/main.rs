use clap::{Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};
use std::sync::Arc;
use std::time::Duration;
use subflow::application::controller::FlowController;
use subflow::domain::flow::FlowState;
use subflow::domain::ports::RegistrationGateway;
use subflow::domain::registration::{Registration, Role};
use subflow::error::SubscribeError;
use subflow::infrastructure::http::HttpPaymentGateway;
use subflow::infrastructure::session::{DEFAULT_TOKEN_VAR, EnvTokenSource};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the backend payment/auth service
    #[arg(long, default_value = "http://localhost:5000/api")]
    base_url: String,

    /// Environment variable holding the session token
    #[arg(long, default_value = DEFAULT_TOKEN_VAR)]
    token_var: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        password: String,
        #[arg(long, value_enum, default_value = "customer")]
        role: RoleArg,
    },
    /// Send the STK push and wait for payment confirmation
    Subscribe {
        /// MPesa number, e.g. 07XXXXXXXX
        phone: String,

        /// Seconds between status checks
        #[arg(long, default_value_t = 3)]
        cadence_secs: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Customer,
    Cleaner,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Customer => Role::Customer,
            RoleArg::Cleaner => Role::Cleaner,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let gateway = Arc::new(HttpPaymentGateway::new(&cli.base_url));

    match cli.command {
        Command::Register {
            name,
            email,
            phone,
            password,
            role,
        } => {
            let registration = Registration {
                name,
                email,
                phone: phone.parse().into_diagnostic()?,
                password,
                role: role.into(),
            };
            gateway.register(&registration).await.into_diagnostic()?;

            println!("Registration successful! Please subscribe:");
            println!("    subflow subscribe {}", registration.phone);
        }
        Command::Subscribe {
            phone,
            cadence_secs,
        } => {
            let tokens = Arc::new(EnvTokenSource::new(&cli.token_var));
            let mut controller = FlowController::with_cadence(
                gateway,
                tokens,
                Duration::from_secs(cadence_secs),
            );
            let mut state = controller.state();

            controller
                .subscribe(
                    &phone,
                    Box::new(|| {
                        println!("Payment successful! You can now open the dashboard.");
                    }),
                )
                .await
                .map_err(|err| {
                    if matches!(err, SubscribeError::MissingToken) {
                        eprintln!(
                            "Sign in first, then export the session token as {}.",
                            cli.token_var
                        );
                    }
                    err
                })
                .into_diagnostic()?;

            println!("STK push sent! Complete the payment on your phone.");

            tokio::select! {
                result = state.wait_for(FlowState::is_terminal) => {
                    result.into_diagnostic()?;
                }
                _ = tokio::signal::ctrl_c() => {
                    controller.shutdown();
                    println!("Stopped waiting. Run subscribe again anytime, or sign back in first.");
                }
            }
        }
    }

    Ok(())
}
