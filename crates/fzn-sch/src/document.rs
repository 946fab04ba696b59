//! Typed view of a Fritzing schematic (`.fz`) document.
//!
//! Only what netlist extraction needs is kept: per instance the module
//! reference, the model index, its properties and the schematic view with
//! its declared connections. Breadboard and PCB views are ignored.

use fzn_parts::Properties;
use roxmltree::{Document, Node, ParsingOptions};

use crate::{Result, SketchError};

/// View layers that place an instance on the schematic.
pub const SCHEMATIC_LAYERS: &[&str] = &["schematic", "schematicTrace"];

pub fn is_schematic_layer(layer: &str) -> bool {
    SCHEMATIC_LAYERS.contains(&layer)
}

#[derive(Debug, Clone, Default)]
pub struct SketchDocument {
    pub instances: Vec<InstanceDecl>,
}

#[derive(Debug, Clone)]
pub struct InstanceDecl {
    pub module_id: String,
    /// Model index; unique within one sketch.
    pub instance_id: String,
    pub title: Option<String>,
    pub properties: Properties,
    pub schematic_view: Option<ViewDecl>,
}

#[derive(Debug, Clone, Default)]
pub struct ViewDecl {
    pub layer: Option<String>,
    pub connectors: Vec<ConnectorDecl>,
}

#[derive(Debug, Clone)]
pub struct ConnectorDecl {
    pub connector_id: String,
    pub layer: Option<String>,
    pub connects: Vec<ConnectDecl>,
}

/// A declared connection to another instance's connector.
#[derive(Debug, Clone)]
pub struct ConnectDecl {
    pub connector_id: String,
    pub instance_id: String,
    pub layer: Option<String>,
}

impl InstanceDecl {
    /// The schematic view, if this instance is placed on a schematic layer.
    pub fn schematic(&self) -> Option<&ViewDecl> {
        self.schematic_view
            .as_ref()
            .filter(|view| view.layer.as_deref().is_some_and(is_schematic_layer))
    }
}

impl SketchDocument {
    pub fn parse(xml: &str) -> Result<Self> {
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let doc = Document::parse_with_options(xml, options)?;
        Self::from_document(&doc)
    }

    fn from_document(doc: &Document) -> Result<Self> {
        let root = doc.root_element();
        if root.tag_name().name() != "module" {
            return Err(SketchError::InvalidStructure(format!(
                "Expected root element 'module', found '{}'",
                root.tag_name().name()
            )));
        }

        let instances = children(root, "instances")
            .flat_map(|list| children(list, "instance"))
            .map(|node| parse_instance(&node))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { instances })
    }
}

fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

fn child<'a, 'input: 'a>(node: Node<'a, 'input>, name: &'static str) -> Option<Node<'a, 'input>> {
    children(node, name).next()
}

fn required_attr(node: &Node, attr: &'static str, element: &'static str) -> Result<String> {
    node.attribute(attr)
        .map(str::to_string)
        .ok_or(SketchError::MissingAttribute { element, attr })
}

fn parse_instance(node: &Node) -> Result<InstanceDecl> {
    let module_id = required_attr(node, "moduleIdRef", "instance")?;
    let instance_id = required_attr(node, "modelIndex", "instance")?;

    let title = child(*node, "title")
        .and_then(|t| t.text())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    let properties = children(*node, "property")
        .filter_map(|p| {
            let name = p.attribute("name")?.trim().to_lowercase();
            let value = p
                .attribute("value")
                .or_else(|| p.text())
                .unwrap_or_default()
                .trim()
                .to_string();
            Some((name, value))
        })
        .collect();

    let schematic_view = child(*node, "views")
        .and_then(|views| child(views, "schematicView"))
        .map(|view| parse_view(&view))
        .transpose()?;

    Ok(InstanceDecl {
        module_id,
        instance_id,
        title,
        properties,
        schematic_view,
    })
}

fn parse_view(node: &Node) -> Result<ViewDecl> {
    let connectors = children(*node, "connectors")
        .flat_map(|list| children(list, "connector"))
        .map(|c| parse_connector(&c))
        .collect::<Result<Vec<_>>>()?;

    Ok(ViewDecl {
        layer: node.attribute("layer").map(str::to_string),
        connectors,
    })
}

fn parse_connector(node: &Node) -> Result<ConnectorDecl> {
    let connector_id = required_attr(node, "connectorId", "connector")?;
    let connects = children(*node, "connects")
        .flat_map(|list| children(list, "connect"))
        .map(|c| {
            Ok(ConnectDecl {
                connector_id: required_attr(&c, "connectorId", "connect")?,
                instance_id: required_attr(&c, "modelIndex", "connect")?,
                layer: c.attribute("layer").map(str::to_string),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ConnectorDecl {
        connector_id,
        layer: node.attribute("layer").map(str::to_string),
        connects,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SKETCH: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<module fritzingVersion="0.9.3b">
  <instances>
    <instance moduleIdRef="ResistorModuleID" modelIndex="5771" path=":/resources/parts/core/resistor.fzp">
      <property name="Resistance" value="220Ω"/>
      <title>R1</title>
      <views>
        <breadboardView layer="breadboard"/>
        <schematicView layer="schematic">
          <geometry z="2.5" x="10" y="20"/>
          <connectors>
            <connector connectorId="connector0" layer="schematic">
              <geometry x="0" y="0"/>
              <connects>
                <connect connectorId="connector1" modelIndex="5790" layer="schematicTrace"/>
              </connects>
            </connector>
          </connectors>
        </schematicView>
      </views>
    </instance>
    <instance moduleIdRef="WireModuleID" modelIndex="5790">
      <views><breadboardView layer="breadboardWire"/></views>
    </instance>
  </instances>
</module>"#;

    #[test]
    fn parses_instances_and_connections() {
        let doc = SketchDocument::parse(SKETCH).unwrap();
        assert_eq!(doc.instances.len(), 2);

        let resistor = &doc.instances[0];
        assert_eq!(resistor.module_id, "ResistorModuleID");
        assert_eq!(resistor.instance_id, "5771");
        assert_eq!(resistor.title.as_deref(), Some("R1"));
        assert_eq!(
            resistor.properties.get("resistance").map(String::as_str),
            Some("220Ω")
        );

        let view = resistor.schematic().unwrap();
        assert_eq!(view.connectors.len(), 1);
        let connect = &view.connectors[0].connects[0];
        assert_eq!(connect.instance_id, "5790");
        assert_eq!(connect.connector_id, "connector1");
        assert_eq!(connect.layer.as_deref(), Some("schematicTrace"));
    }

    #[test]
    fn breadboard_only_instances_have_no_schematic() {
        let doc = SketchDocument::parse(SKETCH).unwrap();
        assert!(doc.instances[1].schematic().is_none());
    }

    #[test]
    fn missing_model_index_is_reported() {
        let err = SketchDocument::parse(
            r#"<module><instances><instance moduleIdRef="X"/></instances></module>"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SketchError::MissingAttribute {
                element: "instance",
                attr: "modelIndex"
            }
        ));
    }

    #[test]
    fn wrong_root_is_rejected() {
        assert!(matches!(
            SketchDocument::parse("<sketch/>"),
            Err(SketchError::InvalidStructure(_))
        ));
    }
}
