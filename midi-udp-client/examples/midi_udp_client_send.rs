use clap::{Parser, Subcommand};
use ivory_midi_udp_client::{Message, MidiUdpClient};

#[derive(Subcommand, Debug)]
enum Command {
    /// Play a note for a moment
    Note {
        #[arg(short, long, default_value_t = 60)]
        note: u8,
        #[arg(short, long, default_value_t = 100)]
        velocity: u8,
        #[arg(long, default_value_t = 500)]
        duration_ms: u64,
    },
    /// Set a controller
    Controller {
        #[arg(short, long, default_value_t = 0)]
        controller: u8,
        #[arg(short, long)]
        value: u8,
    },
    /// Bend pitch by a value between -1 and 1
    PitchBend {
        #[arg(allow_negative_numbers = true)]
        value: f32,
    },
    /// Silence everything on the channel
    Panic,
}

#[derive(Parser, Debug)]
struct Args {
    #[command(subcommand)]
    command: Command,
    #[arg(short, long)]
    server: String,
    #[arg(long, default_value_t = 0)]
    channel: u8,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let client = MidiUdpClient::new(args.server)?;
    let channel = (args.channel & 0x0F) << 4;
    match args.command {
        Command::Note {
            note,
            velocity,
            duration_ms,
        } => {
            client.send(&Message::note_on(channel, note, velocity))?;
            std::thread::sleep(std::time::Duration::from_millis(duration_ms));
            client.send(&Message::note_off(channel, note, 0))?;
        }
        Command::Controller { controller, value } => {
            client.send(&Message::control_change(channel, controller, value))?;
        }
        Command::PitchBend { value } => {
            client.send(&Message::pitch_bend_f32(channel, value))?;
        }
        Command::Panic => {
            client.send_all(&[
                Message::all_notes_off(channel),
                Message::all_sounds_off(channel),
            ])?;
        }
    }
    Ok(())
}
