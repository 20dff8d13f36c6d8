//! Instruction emitter — renders scheduler steps into directives.

use spindle_core::units::Quantity;
use spindle_core::{Cell, Directive, InstructionSink, Marker, TimerDuration, to_sentence};

use crate::pipeline::Step;

/// Minutes freshly aliquoted tubes sit on ice in cold runs.
pub const CHILL_MINUTES: u32 = 30;

/// Turns one scheduler step into directives.
pub trait InstructionEmitter {
    fn emit(&mut self, step: &Step, sink: &mut dyn InstructionSink);
}

/// Default English rendering for a bench technician.
#[derive(Debug, Clone, Copy, Default)]
pub struct TechnicianEmitter {
    cold: bool,
}

impl TechnicianEmitter {
    pub fn new(cold: bool) -> Self {
        Self { cold }
    }
}

impl InstructionEmitter for TechnicianEmitter {
    fn emit(&mut self, step: &Step, sink: &mut dyn InstructionSink) {
        let cold = self.cold;
        match step {
            Step::FetchSupplies {
                media,
                tube_count,
                tube_volume,
            } => {
                let (media_location, tube_location) = if cold {
                    ("in fridge", "in freezer")
                } else {
                    ("on bench", "on bench")
                };
                sink.emit(Directive::title("Grab required suspension media"));
                sink.emit(Directive::note(
                    "For the following set of centrifuging instructions, \
                     you will need the following supplies:",
                ));
                for m in media {
                    sink.emit(Directive::check(format!(
                        "At least {} of {}",
                        Quantity::milliliters(m.volume_ml),
                        m.media
                    )));
                }
                sink.emit(Directive::note(format!(
                    "Place all media bottles {media_location} in preparation for centrifuge."
                )));
                sink.emit(Directive::note(format!(
                    "Place {tube_count} {} tubes {tube_location} in preparation for centrifuge.",
                    Quantity::milliliters(*tube_volume)
                )));
            }

            Step::PrepareIceBath => {
                sink.emit(Directive::title("Get ice (skip if you already have ice)"));
                sink.emit(Directive::note(
                    "Fill a large bucket with ice from the ice machine.",
                ));
                sink.emit(Directive::note(
                    "If no ice machine is available, make a water bath of mostly ice, \
                     or use the chilled aluminum bead bucket and return it to the \
                     freezer between spins.",
                ));
            }

            Step::ChillTubes {
                tube_count,
                tube_volume,
            } => {
                sink.emit(Directive::title("Prepare chilled tubes"));
                sink.emit(Directive::note(format!(
                    "Take the {tube_count} {} {} from the freezer and immerse in ice bath.",
                    Quantity::milliliters(*tube_volume),
                    if *tube_count == 1 { "tube" } else { "tubes" }
                )));
            }

            Step::AliquotItems {
                items,
                tubes_per_item,
                aliquot_volume,
                tube_volume,
            } => {
                let tube_volume = Quantity::milliliters(*tube_volume);
                sink.emit(Directive::title(format!(
                    "Aliquot items into {tube_volume} tubes for centrifuging"
                )));
                sink.emit(Directive::note(format!(
                    "You should have {} {tube_volume} tubes.",
                    items.len() * tubes_per_item
                )));
                if cold {
                    sink.emit(Directive::note(
                        "While labeling and pouring, leave tubes in ice bath as much as possible.",
                    ));
                }
                for (i, item) in items.iter().enumerate() {
                    let short_id = i + 1;
                    sink.emit(Directive::note(format!(
                        "Label {tubes_per_item} tubes with short id: {short_id}"
                    )));
                    sink.emit(Directive::note(format!(
                        "Carefully pour {} from {} into each tube labeled as {short_id}.",
                        Quantity::milliliters(*aliquot_volume),
                        item.display_name()
                    )));
                }
                if cold {
                    sink.emit(Directive::note(format!(
                        "Leave tubes to chill for {CHILL_MINUTES} minutes."
                    )));
                    sink.emit(Directive::timer(TimerDuration::from_minutes(CHILL_MINUTES)));
                }
            }

            Step::GroupBatches { capacity, batches } => {
                sink.emit(Directive::title(format!(
                    "Separate tubes into batches of {capacity} or less"
                )));
                sink.emit(Directive::note(
                    "Group tubes into batches as shown and mark each tube \
                     with its alphabetic batch identifier.",
                ));
                for batch in batches {
                    sink.emit(Directive::check(format!(
                        "{}: batch {}",
                        to_sentence(&batch.tubes),
                        batch.marker
                    )));
                }
            }

            Step::Centrifuge { batch, settings } => {
                sink.emit(Directive::title("Centrifuge tubes"));
                sink.emit(Directive::note(format!(
                    "Set the centrifuge to {} rpm for {} at {}. \
                     Ensure correct centrifuge tube holders are in place.",
                    settings.rpm,
                    Quantity::minutes(settings.time_minutes),
                    Quantity::celsius(settings.temp_celsius)
                )));
                sink.emit(Directive::note(format!(
                    "Move all tubes from {} {} to centrifuge and press start.",
                    batch_word(&batch.marker),
                    batch.marker
                )));
                if batch.needs_balance() {
                    sink.emit(Directive::warning(
                        "Balance the centrifuge with a dummy tube that is filled \
                         with the same volume of liquid as the other tubes.",
                    ));
                }
            }

            Step::RemoveTubes { batch } => {
                sink.emit(Directive::title("Remove tubes from centrifuge"));
                sink.emit(Directive::note("Wait for centrifuge to finish."));
                sink.emit(Directive::note(
                    "Once the centrifuge has finished its spin, remove tubes from centrifuge.",
                ));
                sink.emit(Directive::note(format!(
                    "The removed tubes should be marked as {} {}.",
                    batch_word(&batch.marker),
                    batch.marker
                )));
                if cold {
                    sink.emit(Directive::warning(
                        "Once removed from centrifuge, immediately place tubes in ice bath.",
                    ));
                }
            }

            Step::Decant { batch } => {
                sink.emit(Directive::title("Decant tubes"));
                sink.emit(Directive::note(format!(
                    "Take {} to the dishwashing station, and pour out supernatant \
                     of tubes from {} {}.",
                    if cold { "ice bucket" } else { "tubes" },
                    batch_word(&batch.marker),
                    batch.marker
                )));
                if cold {
                    sink.emit(Directive::note("Place tubes in ice immediately after decanting."));
                }
            }

            Step::Resuspend { batch, settings } => {
                let volume = Quantity::milliliters(settings.volume_ml);
                let media = &settings.media;
                sink.emit(Directive::title(format!("Resuspend cells in {volume} of {media}")));
                sink.emit(Directive::note(format!("Grab bottle of {media} from fridge.")));
                sink.emit(Directive::note(format!(
                    "Carefully pour {volume} of {media} into each tube from {} {}.",
                    batch_word(&batch.marker),
                    batch.marker
                )));
                sink.emit(Directive::note(
                    "Shake and vortex tubes until pellet is completely resuspended.",
                ));
                if cold {
                    sink.emit(Directive::warning(
                        "When not actively shaking or vortexing keep tubes in ice, \
                         and place all tubes in ice once resuspended.",
                    ));
                }
                sink.emit(Directive::note(format!(
                    "At next opportunity, bring {media} back to fridge, or to dishwasher if empty."
                )));
            }

            Step::CombineTubes { batch } => {
                let total = batch.len();
                sink.emit(Directive::title("Combine tubes"));
                if batch.marker.is_merged() {
                    sink.emit(Directive::note(format!(
                        "Together, batches {} have a total of {total} tubes. \
                         Reduce the sum of tubes to {} by combining tubes from {} batches.",
                        batch.marker,
                        total / 2,
                        if batch.marker.len() == 2 { "both" } else { "all" }
                    )));
                } else {
                    sink.emit(Directive::note(format!(
                        "Reduce the number of tubes in batch {} from {total} to {} \
                         by combining tubes.",
                        batch.marker,
                        total / 2
                    )));
                }
                sink.emit(Directive::note(
                    "Combine tubes by carefully pouring one tube into a tube \
                     that shares the same id.",
                ));
                sink.emit(Directive::note(
                    "All tubes after combination should have the same volume. \
                     Do not \"double combine\" any tubes.",
                ));
                for short_id in batch.distinct_short_ids() {
                    sink.emit(Directive::note(format!(
                        "Combine each tube labeled {short_id} with another tube labeled {short_id}."
                    )));
                }
                if cold {
                    sink.emit(Directive::warning(
                        "Once finished with combining, immediately place tubes in ice bath.",
                    ));
                }
            }

            // Filled by the caller's hook, not by the emitter.
            Step::ExtraInstructions => {}

            Step::Relabel { tubes, items } => {
                let remaining: Vec<u32> = tubes.iter().map(|t| t.short_id).collect();
                sink.emit(Directive::title("Label finished tubes"));
                sink.emit(Directive::note(format!(
                    "Tubes with the following ids remain: {}.",
                    to_sentence(&remaining)
                )));
                sink.emit(Directive::note(
                    "Label each tube with the item id of the item that they originated from.",
                ));
                for (i, item) in items.iter().enumerate() {
                    sink.emit(Directive::note(format!(
                        "The tube(s) labeled as {} should be relabeled as {}.",
                        i + 1,
                        item.id
                    )));
                }
                let mut rows = vec![vec![
                    Cell::Text("Short id".to_string()),
                    Cell::Text("Item id".to_string()),
                ]];
                rows.extend(items.iter().enumerate().map(|(i, item)| {
                    vec![
                        Cell::Text((i + 1).to_string()),
                        Cell::Checkable {
                            content: item.id.clone(),
                            check: true,
                        },
                    ]
                }));
                sink.emit(Directive::Table { rows });
            }
        }
    }
}

fn batch_word(marker: &Marker) -> &'static str {
    if marker.is_merged() { "batches" } else { "batch" }
}
