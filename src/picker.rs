// File selection surfaces. The scan workflow only needs "zero or one file";
// how that file is chosen is up to the implementation.

use crate::config::PickerKind;
use dialoguer::Input;
use std::path::PathBuf;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "heic", "heif", "tif", "tiff"];

pub trait FilePicker {
    /// Ask for an image. `None` means the user chose nothing.
    fn pick_image(&mut self) -> Option<PathBuf>;
}

/// The platform's native open-file dialog, filtered to images.
#[derive(Debug, Default)]
pub struct NativePicker;

impl FilePicker for NativePicker {
    fn pick_image(&mut self) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .set_title("Take photo / upload card image")
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_file()
    }
}

/// Asks for a path in the terminal. An empty answer means no file.
#[derive(Debug, Default)]
pub struct PromptPicker;

impl FilePicker for PromptPicker {
    fn pick_image(&mut self) -> Option<PathBuf> {
        let answer: String = Input::new()
            .with_prompt("Image file path (leave empty to cancel)")
            .allow_empty(true)
            .interact_text()
            .ok()?;
        path_from_answer(&answer)
    }
}

/// Any closure returning an optional path works as a picker.
impl<F> FilePicker for F
where
    F: FnMut() -> Option<PathBuf>,
{
    fn pick_image(&mut self) -> Option<PathBuf> {
        self()
    }
}

pub fn picker_for(kind: PickerKind) -> Box<dyn FilePicker> {
    match kind {
        PickerKind::Native => Box::new(NativePicker),
        PickerKind::Prompt => Box::new(PromptPicker),
    }
}

// Terminals often paste dragged files wrapped in quotes.
fn path_from_answer(answer: &str) -> Option<PathBuf> {
    let trimmed = answer.trim().trim_matches(|c| c == '"' || c == '\'');
    (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
}
