//! CLI `settings` commands: assistant settings and the user profile.

use anyhow::{bail, Context, Result};
use std::path::Path;

use elevate::avatar::{avatar_from_file, generate_avatar};
use elevate::config::ElevateConfig;
use elevate::store::types::{
    AiSettingsUpdate, UserProfileUpdate, MODELS, PERSONAS, VOICES,
};

use super::{build_client, open_store, spinner};

fn mask(key: &str) -> String {
    if key.is_empty() {
        return "(not set)".into();
    }
    let tail: String = key.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    format!("****{tail}")
}

fn describe_avatar(avatar: &str) -> String {
    if avatar.is_empty() {
        "(none)".into()
    } else {
        format!("set ({} bytes)", avatar.len())
    }
}

pub fn show(config: &ElevateConfig) -> Result<()> {
    let store = open_store(config)?;
    let s = &store.state().ai_settings;
    let p = &store.state().user_profile;

    println!("Assistant");
    println!("{}", "=".repeat(40));
    println!("  Name:      {}", s.name);
    println!("  Persona:   {}", s.persona);
    println!("  Behavior:  {}", s.behavior);
    println!("  Model:     {}", s.model);
    println!("  Voice:     {}", s.voice);
    println!("  API key:   {}", mask(&s.api_key));
    println!("  Avatar:    {}", describe_avatar(&s.avatar));
    println!();
    println!("Profile");
    println!("{}", "=".repeat(40));
    println!("  Name:      {}", p.name);
    println!("  Born:      {}", if p.dob.is_empty() { "-" } else { &p.dob });
    println!("  About:     {}", p.about);
    println!("  Goals:     {}", p.goals);
    println!("  Avatar:    {}", describe_avatar(&p.avatar));
    Ok(())
}

pub fn update_ai(config: &ElevateConfig, update: AiSettingsUpdate) -> Result<()> {
    let mut store = open_store(config)?;
    let settings = store.update_ai_settings(update)?;
    println!("Assistant settings saved ({}, {}).", settings.name, settings.persona);
    Ok(())
}

pub fn update_profile(config: &ElevateConfig, update: UserProfileUpdate) -> Result<()> {
    let mut store = open_store(config)?;
    let profile = store.update_user_profile(update)?;
    println!("Profile saved for {}.", profile.name);
    Ok(())
}

pub fn options() -> Result<()> {
    println!("Personas: {}", PERSONAS.join(", "));
    println!("Models:   {}", MODELS.join(", "));
    println!("Voices:   {}", VOICES.join(", "));
    println!();
    println!("Other values are accepted as free text.");
    Ok(())
}

/// Set an avatar from a file (assistant or profile), or generate the
/// assistant's with the image model.
pub async fn avatar(
    config: &ElevateConfig,
    file: Option<&Path>,
    generate: bool,
    profile: bool,
) -> Result<()> {
    let mut store = open_store(config)?;

    let url = match (file, generate) {
        (Some(path), false) => avatar_from_file(path)?,
        (None, true) => {
            if profile {
                bail!("--generate only applies to the assistant avatar");
            }
            let settings = store.state().ai_settings.clone();
            if !settings.has_api_key() {
                bail!("set an API key first: elevate settings ai --api-key <KEY>");
            }
            let client = build_client(config)?;
            let pb = spinner("Generating avatar...");
            let result = generate_avatar(client.as_ref(), &settings, &config.ai.image_model).await;
            pb.finish_and_clear();
            match result.context("avatar generation failed")? {
                Some(url) => url,
                None => bail!("the model returned no image"),
            }
        }
        _ => bail!("pass exactly one of --file or --generate"),
    };

    if profile {
        store.update_user_profile(UserProfileUpdate {
            avatar: Some(url),
            ..Default::default()
        })?;
        println!("Profile avatar updated.");
    } else {
        store.update_ai_settings(AiSettingsUpdate {
            avatar: Some(url),
            ..Default::default()
        })?;
        println!("Assistant avatar updated.");
    }
    Ok(())
}
