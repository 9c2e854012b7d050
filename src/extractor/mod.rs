pub mod path;
pub mod validated_json;
