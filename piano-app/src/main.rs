use clap::Parser;
use ivory_keyboard::{NoteEvents, NotePhase};
use ivory_midi::NoteMessages;
use ivory_midi_udp_client::MidiUdpClient;
use ivory_widgets::PianoWidget;
use std::path::PathBuf;

mod config;

use config::AppConfig;

#[derive(Parser)]
#[command(name = "ivory_piano_app")]
#[command(
    about = "Touch piano keyboard that sends notes to a synthesizer over UDP"
)]
struct Cli {
    #[arg(short, long)]
    server: String,
    /// JSON file with the keyboard's colors, navigation mode and so on
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the channel from the config file
    #[arg(long)]
    channel: Option<u8>,
    /// Overrides the velocity from the config file
    #[arg(long)]
    velocity: Option<u8>,
    /// Start in octave mode
    #[arg(long)]
    octave_mode: bool,
    #[arg(short, long)]
    title: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let mut config = cli.config.map(AppConfig::load_).unwrap_or_default();
    if let Some(channel) = cli.channel {
        config.channel = channel;
    }
    if let Some(velocity) = cli.velocity {
        config.velocity = velocity;
    }
    if cli.octave_mode {
        config.keyboard.octave_mode = true;
    }
    let client = MidiUdpClient::new(cli.server)?;
    log::info!("Sending notes to {}", client.server_address()?);
    let note_messages = NoteMessages::new(
        config.midi_channel().into(),
        config.midi_velocity().into(),
    );
    let local_echo = config.keyboard.local_echo;
    let mut piano = PianoWidget::new(cli.title.as_deref(), config.keyboard)?;
    let mut buf = NoteEvents::empty();
    while !piano.is_closed() {
        piano.tick(&mut buf)?;
        for &event in &buf {
            let message = note_messages.message(event);
            match client.send(&message) {
                Ok(()) => {
                    if !local_echo {
                        // the note is only highlighted once it has actually been sent
                        piano.keyboard_mut().set_note_displayed(
                            event.note,
                            event.phase == NotePhase::Down,
                        );
                    }
                }
                Err(e) => log::warn!("Failed to send {:?}: {}", message, e),
            }
        }
    }
    client.send(&note_messages.panic())?;
    Ok(())
}
