use assert_matches::assert_matches;

use gbif_media_fetch::domain::{AssetName, SpeciesSlug};
use gbif_media_fetch::error::GbifError;

#[test]
fn slug_from_scientific_name() {
    assert_eq!(
        SpeciesSlug::from_name("Quercus robur").as_str(),
        "quercus_robur"
    );
}

#[test]
fn file_name_from_url() {
    let slug = SpeciesSlug::from_name("Abc def");
    let first = AssetName::from_url("https://static.example.org/photos/123/photo.jpg").unwrap();
    let second = AssetName::from_url("https://static.example.org/photos/456/photo.png").unwrap();
    assert_eq!(first.file_name(&slug), "abc_def-123.jpg");
    assert_eq!(second.file_name(&slug), "abc_def-456.png");
}

#[test]
fn identical_urls_share_a_file_name() {
    let slug = SpeciesSlug::from_name("Abc def");
    let url = "https://static.example.org/photos/123/photo.jpg";
    assert_eq!(
        AssetName::from_url(url).unwrap().file_name(&slug),
        AssetName::from_url(url).unwrap().file_name(&slug)
    );
}

#[test]
fn empty_identifier_is_invalid() {
    let err = AssetName::from_url("").unwrap_err();
    assert_matches!(err, GbifError::InvalidUrl(_));
}
