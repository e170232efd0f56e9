use crate::{
    error::ComposeError,
    models::{
        book::{BookPage, Scene},
        image::GeneratedImage,
    },
};

/// Pair each scene with the image generated for it, in order
pub fn compose(
    scenes: &[Scene],
    images: &[GeneratedImage],
) -> Result<Vec<BookPage>, ComposeError> {
    if scenes.len() != images.len() {
        return Err(ComposeError::LengthMismatch {
            scenes: scenes.len(),
            images: images.len(),
        });
    }

    Ok(scenes
        .iter()
        .zip(images)
        .map(|(scene, image)| BookPage {
            image_path: image.stored_path.clone(),
            image_type: image.encoding,
            text: scene.text.clone(),
        })
        .collect())
}
