//! Request bodies for the REST endpoints.

use quick_xml::escape::escape;

use crate::config::{DatastoreConfig, LayerGroupConfig, StyleFormat};

/// `<workspace>` descriptor.
pub fn workspace_xml(name: &str) -> String {
    format!("<workspace><name>{}</name></workspace>", escape(name))
}

/// `<dataStore>` descriptor pointing at the configured tile archive.
pub fn datastore_xml(workspace: &str, store: &DatastoreConfig) -> String {
    let mut parameters = vec![
        entry("database", &store.archive_path),
        entry("dbtype", &store.dbtype),
        entry("namespace", workspace),
    ];
    parameters.extend(
        store
            .extra_parameters
            .iter()
            .map(|(key, value)| entry(key, value)),
    );

    format!(
        "<dataStore><name>{}</name><type>{}</type><enabled>true</enabled>\
         <connectionParameters>{}</connectionParameters></dataStore>",
        escape(store.name.as_str()),
        escape(store.store_type.as_str()),
        parameters.concat()
    )
}

fn entry(key: &str, value: &str) -> String {
    format!("<entry key=\"{}\">{}</entry>", escape(key), escape(value))
}

/// `<featureType>` publish request. Name, native name and title are all the discovered name.
pub fn feature_type_xml(name: &str) -> String {
    let name = escape(name);
    format!(
        "<featureType><name>{name}</name><nativeName>{name}</nativeName>\
         <title>{name}</title><enabled>true</enabled></featureType>"
    )
}

/// `<style>` descriptor declaring format and file name.
pub fn style_xml(name: &str, format: StyleFormat) -> String {
    format!(
        "<style><name>{}</name><filename>{}.{}</filename><format>{}</format></style>",
        escape(name),
        escape(name),
        format.extension(),
        format.as_str()
    )
}

/// `<layerGroup>` descriptor.
///
/// The empty `<publishables/>` marker lets the server pick up every published
/// layer of the workspace. `style` is the workspace-local style name, omitted
/// when the style could not be created.
pub fn layer_group_xml(workspace: &str, group: &LayerGroupConfig, style: Option<&str>) -> String {
    let styles = match style {
        Some(style) => format!(
            "<styles><style><name>{}:{}</name></style></styles>",
            escape(workspace),
            escape(style)
        ),
        None => String::new(),
    };

    format!(
        "<layerGroup><name>{}</name><mode>{}</mode><title>{}</title>\
         <workspace><name>{}</name></workspace><publishables/>{}</layerGroup>",
        escape(group.name.as_str()),
        escape(group.mode.as_str()),
        escape(group.title.as_str()),
        escape(workspace),
        styles
    )
}
