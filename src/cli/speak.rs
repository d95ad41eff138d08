//! CLI `speak` command: read text aloud with the configured voice.

use anyhow::{bail, Result};
use std::sync::Arc;

use elevate::chat::transcript::Transcript;
use elevate::config::ElevateConfig;
use elevate::speech::audio::CommandSink;
use elevate::speech::{SpeakOutcome, Speaker};

use super::{build_client, open_store, spinner};

/// Speak `text`, or the latest assistant message when none is given.
pub async fn speak(config: &ElevateConfig, text: Option<&str>) -> Result<()> {
    let store = open_store(config)?;
    let settings = store.state().ai_settings.clone();

    let text = match text {
        Some(t) => t.to_string(),
        None => match Transcript::load(&store)?.last_assistant() {
            Some(m) => m.content.clone(),
            None => bail!("nothing to speak"),
        },
    };

    let sink = Arc::new(CommandSink::new(
        config.audio.player.clone(),
        config.resolved_audio_dir(),
    ));
    let speaker = Speaker::new(build_client(config)?, sink, config.ai.tts_model.clone());

    let pb = spinner("Speaking...");
    let outcome = speaker.speak(&settings, &text).await;
    pb.finish_and_clear();

    match outcome? {
        SpeakOutcome::Played => {}
        SpeakOutcome::Skipped => {
            eprintln!("No API key configured. Run `elevate settings ai --api-key <KEY>`.")
        }
    }
    Ok(())
}
