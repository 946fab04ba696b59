//! Sketch and catalog builders shared by the unit tests.

use fzn_parts::{CatalogSource, PartRegistry};

pub(crate) const RESISTOR_FZP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<module moduleId="ResistorModuleID" fritzingVersion="0.3.16">
  <title>220Ω Resistor</title>
  <label>R</label>
  <properties>
    <property name="family">Resistor</property>
    <property name="Resistance" showInLabel="yes">220Ω</property>
  </properties>
  <connectors>
    <connector id="connector0" name="Pin 0" type="male"/>
    <connector id="connector1" name="Pin 1" type="male"/>
  </connectors>
</module>"#;

pub(crate) const BUTTON_FZP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<module moduleId="PushbuttonModuleID">
  <title>Pushbutton</title>
  <label>S</label>
  <connectors>
    <connector id="connector0" name="leg0"/>
    <connector id="connector1" name="leg1"/>
  </connectors>
</module>"#;

pub(crate) fn catalog() -> PartRegistry {
    PartRegistry::load(&[CatalogSource::new(
        "core",
        vec![RESISTOR_FZP.to_string(), BUTTON_FZP.to_string()],
    )])
}

/// Builds `.fz` documents one instance at a time.
#[derive(Debug, Default)]
pub(crate) struct SketchBuilder {
    instances: Vec<String>,
}

impl SketchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place an instance on the schematic. `connections` are
    /// `(own connector, far instance, far connector)`.
    pub fn place(
        self,
        module_id: &str,
        index: &str,
        properties: &[(&str, &str)],
        connections: &[(&str, &str, &str)],
    ) -> Self {
        self.place_on("schematic", module_id, index, properties, connections)
    }

    pub fn place_on(
        mut self,
        layer: &str,
        module_id: &str,
        index: &str,
        properties: &[(&str, &str)],
        connections: &[(&str, &str, &str)],
    ) -> Self {
        let properties: String = properties
            .iter()
            .map(|(k, v)| format!(r#"<property name="{k}" value="{v}"/>"#))
            .collect();
        let connectors: String = connections
            .iter()
            .map(|(own, far, far_connector)| {
                format!(
                    r#"<connector connectorId="{own}" layer="{layer}"><connects><connect connectorId="{far_connector}" modelIndex="{far}" layer="{layer}"/></connects></connector>"#
                )
            })
            .collect();
        self.instances.push(format!(
            r#"<instance moduleIdRef="{module_id}" modelIndex="{index}">{properties}<views><schematicView layer="{layer}"><connectors>{connectors}</connectors></schematicView></views></instance>"#
        ));
        self
    }

    /// A wire from `a` to `b`, each given as `(instance, connector)`.
    pub fn wire(self, index: &str, a: (&str, &str), b: (&str, &str)) -> Self {
        self.place_on(
            "schematicTrace",
            "WireModuleID",
            index,
            &[],
            &[("connector0", a.0, a.1), ("connector1", b.0, b.1)],
        )
    }

    pub fn raw(mut self, instance_xml: &str) -> Self {
        self.instances.push(instance_xml.to_string());
        self
    }

    pub fn build(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><module fritzingVersion="0.9.3b"><instances>{}</instances></module>"#,
            self.instances.concat()
        )
    }
}
