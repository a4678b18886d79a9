use anyhow::Result;
use clap::{Parser, Subcommand};
use dialoguer::Password;
use dotenvy::dotenv;

use classconnect_cli::tools::{self, TokenReport};
use classconnect_config::{HasherConfig, JwtConfig};

#[derive(Parser)]
#[command(name = "classconnect-cli")]
#[command(about = "ClassConnect CLI - Credential and session token tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hash a password into a storable credential record
    HashPassword {
        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Sign a session token with the configured secret
    SignToken {
        /// Account identifier
        #[arg(short = 's', long)]
        subject: String,

        /// Login name
        #[arg(short = 'u', long)]
        username: String,

        /// Role carried by the token
        #[arg(short = 'r', long)]
        role: String,
    },
    /// Verify a session token and print its claims
    VerifyToken {
        /// The token to check
        token: String,
    },
    /// Generate a password reset token and its stored digest
    ResetToken,
}

fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command) {
        eprintln!("\n❌ {e:#}");
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::HashPassword { password } => handle_hash_password(password),
        Commands::SignToken {
            subject,
            username,
            role,
        } => handle_sign_token(&subject, &username, &role),
        Commands::VerifyToken { token } => handle_verify_token(&token),
        Commands::ResetToken => {
            handle_reset_token();
            Ok(())
        }
    }
}

fn handle_hash_password(password: Option<String>) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()?,
    };

    let record = tools::hash_password(&HasherConfig::from_env(), &password)?;
    println!("{record}");
    Ok(())
}

fn handle_sign_token(subject: &str, username: &str, role: &str) -> Result<()> {
    let config = JwtConfig::from_env();
    let token = tools::sign_token(&config, subject, username, role)?;

    println!("{token}");
    eprintln!(
        "\n✅ Signed for {username} ({role}), valid for {}s",
        config.token_expiry.as_secs()
    );
    Ok(())
}

fn handle_verify_token(token: &str) -> Result<()> {
    match tools::verify_token(&JwtConfig::from_env(), token) {
        TokenReport::Valid(claims) => {
            println!("✅ Token is valid");
            println!("   Subject:  {}", claims.sub);
            println!("   Username: {}", claims.username);
            println!("   Role:     {}", claims.role);
            println!("   Issued:   {}", tools::format_timestamp(claims.iat));
            println!("   Expires:  {}", tools::format_timestamp(claims.exp));
            Ok(())
        }
        TokenReport::Expired => anyhow::bail!("Token expired"),
        TokenReport::Invalid => anyhow::bail!("Token is invalid"),
    }
}

fn handle_reset_token() {
    let pair = tools::reset_token();
    println!("Token:  {}", pair.plaintext);
    println!("Digest: {}", pair.digest);
}
