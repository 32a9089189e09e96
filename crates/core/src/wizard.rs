//! Storybook wizard state, reducer, and step navigation.
//!
//! [`WizardData`] is the flat record the wizard fills in one field at a time.
//! [`reduce`] applies a [`WizardAction`] to it without any validation of the
//! values or of the order in which fields are filled. Only the sanitized copy
//! returned by [`WizardData::persisted`] is ever written to storage: photo
//! previews (data URLs) live in responses only.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// A photo attached to the child or to a character.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoSlot {
    /// Object storage path inside the `images` bucket once uploaded.
    pub path: Option<String>,
    /// `data:` URL preview of the selected file. Never persisted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    /// Set while the bytes are being written to object storage.
    pub uploading: bool,
}

impl PhotoSlot {
    /// Reset the slot so the client re-prompts for a photo.
    pub fn clear(&mut self) {
        self.path = None;
        self.preview = None;
        self.uploading = false;
    }
}

/// An additional character appearing in the story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardCharacter {
    pub id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub relation: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub photo: PhotoSlot,
}

/// Character fields as sent by the client in add/update actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterInput {
    /// Client-chosen id; one is generated when absent.
    pub id: Option<Uuid>,
    pub name: Option<String>,
    pub relation: Option<String>,
    pub gender: Option<String>,
    pub photo_path: Option<String>,
    pub photo_preview: Option<String>,
}

/// Everything the wizard collects before checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardData {
    pub age_category: Option<String>,
    pub theme: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
    pub style: Option<String>,
    pub custom_note: Option<String>,
    pub child_name: Option<String>,
    pub child_gender: Option<String>,
    pub email: Option<String>,
    pub child_photo: PhotoSlot,
    pub characters: Vec<WizardCharacter>,
}

impl WizardData {
    /// Copy suitable for storage: previews stripped, everything else kept.
    pub fn persisted(&self) -> WizardData {
        let mut copy = self.clone();
        copy.child_photo.preview = None;
        for character in &mut copy.characters {
            character.photo.preview = None;
        }
        copy
    }

    /// Whether any photo is still being written to object storage.
    pub fn has_pending_upload(&self) -> bool {
        self.child_photo.uploading || self.characters.iter().any(|c| c.photo.uploading)
    }

    /// Look up the slot a photo upload targets.
    pub fn photo_slot_mut(&mut self, target: PhotoTarget) -> Result<&mut PhotoSlot, CoreError> {
        match target {
            PhotoTarget::Child => Ok(&mut self.child_photo),
            PhotoTarget::Character(id) => self
                .characters
                .iter_mut()
                .find(|c| c.id == id)
                .map(|c| &mut c.photo)
                .ok_or(CoreError::NotFound {
                    entity: "WizardCharacter",
                    id,
                }),
        }
    }
}

/// Which photo slot an upload writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoTarget {
    Child,
    Character(Uuid),
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// Flat fields addressable by `UPDATE_FIELD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardField {
    AgeCategory,
    Theme,
    Subject,
    Message,
    Style,
    CustomNote,
    ChildName,
    ChildGender,
    Email,
    ChildPhotoPath,
    ChildPhotoPreview,
}

impl WizardField {
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            "age_category" => Ok(Self::AgeCategory),
            "theme" => Ok(Self::Theme),
            "subject" => Ok(Self::Subject),
            "message" => Ok(Self::Message),
            "style" => Ok(Self::Style),
            "custom_note" => Ok(Self::CustomNote),
            "child_name" => Ok(Self::ChildName),
            "child_gender" => Ok(Self::ChildGender),
            "email" => Ok(Self::Email),
            "child_photo_path" => Ok(Self::ChildPhotoPath),
            "child_photo_preview" => Ok(Self::ChildPhotoPreview),
            _ => Err(CoreError::Validation(format!(
                "Unknown wizard field '{name}'"
            ))),
        }
    }

    fn slot<'a>(self, data: &'a mut WizardData) -> &'a mut Option<String> {
        match self {
            Self::AgeCategory => &mut data.age_category,
            Self::Theme => &mut data.theme,
            Self::Subject => &mut data.subject,
            Self::Message => &mut data.message,
            Self::Style => &mut data.style,
            Self::CustomNote => &mut data.custom_note,
            Self::ChildName => &mut data.child_name,
            Self::ChildGender => &mut data.child_gender,
            Self::Email => &mut data.email,
            Self::ChildPhotoPath => &mut data.child_photo.path,
            Self::ChildPhotoPreview => &mut data.child_photo.preview,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WizardAction {
    UpdateField {
        field: String,
        #[serde(default)]
        value: Option<String>,
    },
    AddCharacter {
        character: CharacterInput,
    },
    UpdateCharacter {
        id: Uuid,
        character: CharacterInput,
    },
    RemoveCharacter {
        id: Uuid,
    },
    ResetWizard,
}

impl WizardAction {
    /// Action name as the client spells it, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::UpdateField { .. } => "UPDATE_FIELD",
            Self::AddCharacter { .. } => "ADD_CHARACTER",
            Self::UpdateCharacter { .. } => "UPDATE_CHARACTER",
            Self::RemoveCharacter { .. } => "REMOVE_CHARACTER",
            Self::ResetWizard => "RESET_WIZARD",
        }
    }
}

/// Apply one action to the wizard state.
///
/// The only failure is an `UPDATE_FIELD` naming a field that does not exist.
/// Updating or removing an unknown character id leaves the state unchanged.
pub fn reduce(mut state: WizardData, action: WizardAction) -> Result<WizardData, CoreError> {
    match action {
        WizardAction::UpdateField { field, value } => {
            let field = WizardField::from_name(&field)?;
            *field.slot(&mut state) = value;
        }
        WizardAction::AddCharacter { character } => {
            state.characters.push(WizardCharacter {
                id: character.id.unwrap_or_else(Uuid::new_v4),
                name: character.name,
                relation: character.relation,
                gender: character.gender,
                photo: PhotoSlot {
                    path: character.photo_path,
                    preview: character.photo_preview,
                    uploading: false,
                },
            });
        }
        WizardAction::UpdateCharacter { id, character } => {
            if let Some(existing) = state.characters.iter_mut().find(|c| c.id == id) {
                existing.name = character.name;
                existing.relation = character.relation;
                existing.gender = character.gender;
                if character.photo_path.is_some() {
                    existing.photo.path = character.photo_path;
                }
                if character.photo_preview.is_some() {
                    existing.photo.preview = character.photo_preview;
                }
            }
        }
        WizardAction::RemoveCharacter { id } => {
            state.characters.retain(|c| c.id != id);
        }
        WizardAction::ResetWizard => {
            state = WizardData::default();
        }
    }
    Ok(state)
}

// ---------------------------------------------------------------------------
// Session status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardSessionStatus {
    InProgress,
    Submitted,
}

impl WizardSessionStatus {
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "in_progress" => Ok(Self::InProgress),
            "submitted" => Ok(Self::Submitted),
            _ => Err(CoreError::Validation(format!(
                "Invalid wizard session status '{s}'. Must be one of: in_progress, submitted"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Submitted => "submitted",
        }
    }
}

/// Reject changes to a session that has already gone through checkout.
pub fn ensure_in_progress(status: &str) -> Result<(), CoreError> {
    if status != WizardSessionStatus::InProgress.as_str() {
        return Err(CoreError::Conflict(format!(
            "Wizard session is '{status}' and can no longer be changed"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// The wizard pages, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Age,
    Theme,
    Subject,
    Message,
    Style,
    ChildProfile,
    Characters,
    Checkout,
}

/// Minimum step number (1-based).
pub const MIN_STEP: u8 = 1;

/// Maximum step number (1-based).
pub const MAX_STEP: u8 = 8;

impl WizardStep {
    pub fn from_number(n: u8) -> Result<Self, CoreError> {
        match n {
            1 => Ok(Self::Age),
            2 => Ok(Self::Theme),
            3 => Ok(Self::Subject),
            4 => Ok(Self::Message),
            5 => Ok(Self::Style),
            6 => Ok(Self::ChildProfile),
            7 => Ok(Self::Characters),
            8 => Ok(Self::Checkout),
            _ => Err(CoreError::Validation(format!(
                "Invalid step number {n}. Must be between {MIN_STEP} and {MAX_STEP}"
            ))),
        }
    }

    pub fn to_number(self) -> u8 {
        match self {
            Self::Age => 1,
            Self::Theme => 2,
            Self::Subject => 3,
            Self::Message => 4,
            Self::Style => 5,
            Self::ChildProfile => 6,
            Self::Characters => 7,
            Self::Checkout => 8,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::Theme => "Theme",
            Self::Subject => "Subject",
            Self::Message => "Message",
            Self::Style => "Style",
            Self::ChildProfile => "Child Profile",
            Self::Characters => "Characters",
            Self::Checkout => "Checkout",
        }
    }
}

/// Validate a step transition: exactly one step forward or back, both in range.
pub fn validate_step_transition(current: u8, next: u8) -> Result<(), CoreError> {
    if !(MIN_STEP..=MAX_STEP).contains(&current) {
        return Err(CoreError::Validation(format!(
            "Current step {current} is out of range ({MIN_STEP}..{MAX_STEP})"
        )));
    }
    if !(MIN_STEP..=MAX_STEP).contains(&next) {
        return Err(CoreError::Validation(format!(
            "Next step {next} is out of range ({MIN_STEP}..{MAX_STEP})"
        )));
    }

    let diff = i16::from(next) - i16::from(current);
    if diff != 1 && diff != -1 {
        return Err(CoreError::Validation(format!(
            "Cannot move from step {current} to step {next}. \
             Must advance or go back exactly one step."
        )));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
