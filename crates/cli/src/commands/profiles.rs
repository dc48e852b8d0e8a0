use anyhow::{Context, Result};

use filmoteca_core::profiles::{ProfileDraft, ProfileKind};
use filmoteca_core::FetchError;

use crate::cli::ProfilesCommand;
use crate::output::emit;
use crate::state::AppState;

pub async fn execute(state: &AppState, cmd: ProfilesCommand) -> Result<()> {
    let profiles = state.profiles();
    match cmd {
        ProfilesCommand::List => {
            let list = profiles.list().await.context("Failed to list profiles")?;
            let active = profiles.active()?.map(|p| p.id);
            emit(state.format(), &list, || {
                if list.is_empty() {
                    println!("No profiles yet");
                }
                for profile in &list {
                    let marker = if active.as_deref() == Some(profile.id.as_str()) {
                        "*"
                    } else {
                        " "
                    };
                    println!("{} {:<26}  {} ({})", marker, profile.id, profile.name, profile.kind);
                }
            })
        }
        ProfilesCommand::Create { name, kind } => {
            let kind: ProfileKind = kind.parse()?;
            let profile = profiles.create(&ProfileDraft::new(name, kind)).await?;
            println!("Created profile {} ({})", profile.name, profile.id);
            Ok(())
        }
        ProfilesCommand::Rename { id, name } => {
            let current = profiles
                .list()
                .await?
                .into_iter()
                .find(|p| p.id == id)
                .ok_or_else(|| FetchError::NotFound(format!("profile {}", id)))?;
            let profile = profiles
                .update(&id, &ProfileDraft::new(name, current.kind))
                .await?;
            println!("Renamed to {}", profile.name);
            Ok(())
        }
        ProfilesCommand::Delete { id } => {
            profiles.remove(&id).await?;
            println!("Deleted profile {}", id);
            Ok(())
        }
        ProfilesCommand::Select { profile } => {
            let active = profiles.select_by(&profile).await?;
            println!("Active profile: {}", active.name);
            Ok(())
        }
    }
}
