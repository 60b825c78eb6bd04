use crud_cache::Resource;
use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Deserialize, Resource)]
pub struct User {
    pub id: u64,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Resource)]
pub struct BlogPost {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Resource)]
#[resource(model = "people")]
pub struct Profile {
    #[resource(id)]
    pub handle: String,
    pub bio: Option<String>,
}
