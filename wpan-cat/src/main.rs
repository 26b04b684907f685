use clap::{Parser, ValueEnum};
use wpan_cat::{FrameParser, MessageParser};

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
enum Kind {
    /// An IEEE 802.15.4 frame, without FCS.
    #[default]
    Frame,
    /// An AHI command sent by the host.
    Command,
    /// An AHI message sent by the companion core.
    Message,
}

/// `cat` for IEEE 802.15.4 frames and AHI messages.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What the input is.
    #[arg(short, long, value_enum, default_value_t)]
    kind: Kind,

    /// Decode the security of the ACKs reported with received frames.
    #[arg(long)]
    ack_security: bool,

    /// The hex encoded input.
    #[clap(value_parser(clap::builder::NonEmptyStringValueParser::new()))]
    input: String,
}

fn main() -> std::process::ExitCode {
    let args = Args::parse();

    let output = match args.kind {
        Kind::Frame => FrameParser::parse_hex(&args.input),
        Kind::Command => MessageParser::parse_command_hex(&args.input),
        Kind::Message => MessageParser::parse_hex(&args.input, args.ack_security),
    };

    match output {
        Ok(output) => {
            print!("{output}");
            std::process::ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            std::process::ExitCode::FAILURE
        }
    }
}
