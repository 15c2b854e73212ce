use mask_maker::SessionSettings;

#[derive(serde::Deserialize, Debug, Default)]
#[serde(default)]
pub struct Config {
    pub session: SessionSettings,
    pub egui: crate::app::Config,
}
