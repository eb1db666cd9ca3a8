use serde::{Deserialize, Serialize};

/// Deny lists identifying dynamic collections that Plex Meta Manager builds
/// itself, and which therefore must not be regenerated.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Skip {
    pub labels: Vec<String>,
    pub titles: Vec<String>,
}
impl Default for Skip {
    fn default() -> Self {
        Self {
            labels: [
                "Decade",
                "Emmy Awards",
                "Golden Globes Awards",
                "Top Actors",
                "Top Directors",
                "Oscars Winners Awards",
            ]
            .map(String::from)
            .to_vec(),
            titles: [
                "Golden Globes Best Director Winners",
                "Golden Globes Best Picture Winners",
                "Oscars Best Director Winners",
                "Oscars Best Picture Winners",
                "Newly Released",
                "New Episodes",
                "TMDb Airing Today",
                "TMDb On The Air",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}
impl Skip {
    /// Labels and titles are compared after trimming, case-sensitively.
    pub fn is_dynamic<'a>(&self, title: &str, labels: impl IntoIterator<Item = &'a str>) -> bool {
        let denied = |list: &[String], value: &str| list.iter().any(|d| d.trim() == value.trim());
        labels.into_iter().any(|label| denied(&self.labels, label)) || denied(&self.titles, title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Star Wars", &["Decade"], true)]
    #[case("Newly Released", &[], true)]
    #[case(" New Episodes ", &["Custom"], true)]
    #[case("Star Wars", &["Sci-Fi"], false)]
    #[case("newly released", &[], false)]
    fn test_is_dynamic(#[case] title: &str, #[case] labels: &[&str], #[case] expected: bool) {
        assert_eq!(Skip::default().is_dynamic(title, labels.iter().copied()), expected);
    }
}
