use std::{fs::File, io::Write, path::Path};

use quick_xml::{events::BytesText, Writer};

use crate::utils::xml_utils::XMLWriterWrapper;

use super::petri_net_struct::{ArcType, PetriNet, PlaceID};
const OK: Result<(), std::io::Error> = Ok::<(), std::io::Error>(());

///
/// Export a [`PetriNet`] to the PNML format and write the result to the provided writer
/// which implements into [`quick_xml::Writer`] / [`std::io::Write`]
///
/// Places and transitions are written ordered by their id. Silent transitions are marked
/// with the `$invisible$` tool-specific element understood by ProM.
///
pub fn export_petri_net_to_pnml<'a, W>(
    pn: &PetriNet,
    into_writer: impl Into<XMLWriterWrapper<'a, W>>,
) -> Result<(), quick_xml::Error>
where
    W: Write + 'a,
{
    let mut xml_writer: XMLWriterWrapper<'_, W> = into_writer.into();
    let writer = xml_writer.to_xml_writer();

    let mut places: Vec<_> = pn.places.iter().collect();
    places.sort_by_key(|(id, _)| **id);
    let mut transitions: Vec<_> = pn.transitions.iter().collect();
    transitions.sort_by_key(|(id, _)| **id);

    writer
        .create_element("pnml")
        .write_inner_content(|writer| {
            writer
                .create_element("net")
                .with_attributes(vec![
                    ("id", "net1"),
                    (
                        "type",
                        "http://www.pnml.org/version-2009/grammar/pnmlcoremodel",
                    ),
                ])
                .write_inner_content(|writer| {
                    writer
                        .create_element("page")
                        .with_attribute(("id", "n0"))
                        .write_inner_content(|writer| {
                            for (id, place) in &places {
                                writer
                                    .create_element("place")
                                    .with_attribute(("id", id.to_string().as_str()))
                                    .write_inner_content(|writer| {
                                        writer.create_element("name").write_inner_content(
                                            |writer| {
                                                writer
                                                    .create_element("text")
                                                    .write_text_content(BytesText::new(
                                                        id.to_string().as_str(),
                                                    ))?;
                                                OK
                                            },
                                        )?;
                                        let tokens = pn
                                            .initial_marking
                                            .as_ref()
                                            .and_then(|m| m.get(&PlaceID::from(*place)));
                                        if let Some(tokens) = tokens {
                                            writer
                                                .create_element("initialMarking")
                                                .write_inner_content(|writer| {
                                                    writer
                                                        .create_element("text")
                                                        .write_text_content(BytesText::new(
                                                            tokens.to_string().as_str(),
                                                        ))?;
                                                    OK
                                                })?;
                                        }
                                        OK
                                    })?;
                            }
                            for (id, transition) in &transitions {
                                writer
                                    .create_element("transition")
                                    .with_attribute(("id", id.to_string().as_str()))
                                    .write_inner_content(|writer| {
                                        writer.create_element("name").write_inner_content(
                                            |writer| {
                                                writer
                                                    .create_element("text")
                                                    .write_text_content(BytesText::new(
                                                        transition
                                                            .label
                                                            .as_deref()
                                                            .unwrap_or("tau"),
                                                    ))?;
                                                OK
                                            },
                                        )?;
                                        if transition.is_silent() {
                                            writer
                                                .create_element("toolspecific")
                                                .with_attributes(vec![
                                                    ("tool", "ProM"),
                                                    ("version", "6.4"),
                                                    ("activity", "$invisible$"),
                                                    ("localNodeID", id.to_string().as_str()),
                                                ])
                                                .write_empty()?;
                                        }
                                        OK
                                    })?;
                            }
                            for arc in &pn.arcs {
                                let (source_id, target_id) = match arc.from_to {
                                    ArcType::PlaceTransition(from, to) => (from, to),
                                    ArcType::TransitionPlace(from, to) => (from, to),
                                };
                                writer
                                    .create_element("arc")
                                    .with_attribute((
                                        "id",
                                        (source_id.to_string() + target_id.to_string().as_str())
                                            .as_str(),
                                    ))
                                    .with_attribute(("source", source_id.to_string().as_str()))
                                    .with_attribute(("target", target_id.to_string().as_str()))
                                    .write_inner_content(|w| {
                                        w.create_element("inscription").write_inner_content(
                                            |w| {
                                                w.create_element("text").write_text_content(
                                                    BytesText::new(
                                                        arc.weight.to_string().as_str(),
                                                    ),
                                                )?;
                                                OK
                                            },
                                        )?;
                                        OK
                                    })?;
                            }
                            OK
                        })?;

                    if let Some(final_markings) = &pn.final_markings {
                        writer
                            .create_element("finalmarkings")
                            .write_inner_content(|writer| {
                                for marking in final_markings {
                                    writer.create_element("marking").write_inner_content(
                                        |writer| {
                                            for (place_id, tokens) in marking {
                                                writer
                                                    .create_element("place")
                                                    .with_attribute((
                                                        "idref",
                                                        place_id.get_uuid().to_string().as_str(),
                                                    ))
                                                    .write_inner_content(|writer| {
                                                        writer
                                                            .create_element("text")
                                                            .write_text_content(BytesText::new(
                                                                tokens.to_string().as_str(),
                                                            ))?;
                                                        OK
                                                    })?;
                                            }
                                            OK
                                        },
                                    )?;
                                }
                                OK
                            })?;
                    }

                    // </net>
                    OK
                })?;
            OK
        })?;
    Ok(())
}

/// Export a [`PetriNet`] to a `.pnml` file (specified through path)
///
/// Also consider using [`PetriNet::export_pnml`] for convenience or
/// [`export_petri_net_to_pnml`] for more control.
pub fn export_petri_net_to_pnml_path<P: AsRef<Path>>(
    pn: &PetriNet,
    path: P,
) -> Result<(), quick_xml::Error> {
    let file = File::create(path)?;
    let mut writer = Writer::new_with_indent(file, b' ', 4);
    export_petri_net_to_pnml(pn, &mut writer)
}
