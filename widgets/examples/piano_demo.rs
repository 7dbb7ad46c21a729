use ivory_keyboard::{KeyboardConfig, NoteEvents, NotePhase};
use ivory_widgets::PianoWidget;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let mut piano =
        PianoWidget::new(Some("piano demo"), KeyboardConfig::default())?;
    let mut buf = NoteEvents::empty();
    while !piano.is_closed() {
        piano.tick(&mut buf)?;
        for event in &buf {
            match event.phase {
                NotePhase::Down => log::info!("down {}", event.note),
                NotePhase::Up => log::info!("up {}", event.note),
            }
        }
    }
    Ok(())
}
