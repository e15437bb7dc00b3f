//! Command-line interface definition using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use mentor_api::config::{DEFAULT_HOST, DEFAULT_PORT};
use mentor_runtime::config::DEFAULT_SERVER_URL;

pub const SERVER_URL_ENV: &str = "MENTOR_SERVER_URL";

/// HackMentor - an AI pair reviewer that watches your screen
#[derive(Parser, Debug)]
#[command(name = "mentor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to state directory
    #[arg(short, long, env = "MENTOR_STATE_DIR", global = true)]
    pub state_dir: Option<PathBuf>,

    /// HackMentor server URL used by client commands
    #[arg(long, env = "MENTOR_SERVER_URL", global = true)]
    pub server_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HackMentor API server
    Serve {
        /// Address to bind
        #[arg(long, env = "MENTOR_HOST", default_value = DEFAULT_HOST)]
        host: String,

        /// Port to listen on
        #[arg(short, long, env = "MENTOR_PORT", default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Allowed CORS origin (repeatable; any origin when omitted)
        #[arg(long = "cors-origin")]
        cors_origins: Vec<String>,
    },

    /// Request a signup code by email
    Signup {
        #[arg(required = true)]
        email: String,

        /// Display name (default: the part of the email before '@')
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Finish signup with the emailed code and choose a password
    Verify {
        #[arg(required = true)]
        email: String,

        /// The 6-digit code from the email
        #[arg(required = true)]
        otp: String,

        #[arg(short, long, env = "MENTOR_PASSWORD")]
        password: String,

        #[arg(short, long)]
        name: Option<String>,
    },

    /// Sign in and save the session
    Login {
        #[arg(required = true)]
        email: String,

        #[arg(short, long, env = "MENTOR_PASSWORD")]
        password: String,
    },

    /// Show the signed-in account
    Whoami,

    /// Forget the saved session
    Logout,

    /// Watch a screenshot file or directory and chat with the mentor
    Watch {
        /// Screenshot file, or a directory whose newest image is used
        #[arg(required = true)]
        path: PathBuf,

        /// Seconds between automatic captures
        #[arg(short, long, default_value_t = 3)]
        interval: u64,

        /// Start with spoken feedback enabled
        #[arg(long)]
        voice: bool,
    },
}

impl Cli {
    /// Returns the state directory override, if one was given.
    pub fn state_dir(&self) -> Option<PathBuf> {
        self.state_dir.clone()
    }

    /// Server URL from the flag, the environment (including env files
    /// loaded after parsing), or the default.
    pub fn server_url(&self) -> String {
        self.server_url
            .clone()
            .or_else(|| std::env::var(SERVER_URL_ENV).ok())
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
            .trim_end_matches('/')
            .to_string()
    }

    /// Returns the log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
