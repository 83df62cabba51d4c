use serde::{Deserialize, Serialize};

/// One prediction record as the inference provider returns it: a box in
/// center form plus class label and confidence score.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPrediction {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub class: String,
    pub confidence: f64,
}

/// Corner-form bounding box as exposed to API consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Detection {
    #[serde(rename = "class")]
    pub class_name: String,
    pub confidence: f64,
    pub bounding_box: BoundingBox,
}

impl Detection {
    /// Converts a provider prediction into corner form. Centers and sizes
    /// truncate toward zero; the half-extent uses floor division so that
    /// negative operands round down rather than toward zero.
    pub fn from_prediction(prediction: &RawPrediction) -> Self {
        let x = prediction.x as i64;
        let y = prediction.y as i64;
        let width = prediction.width as i64;
        let height = prediction.height as i64;

        Self {
            class_name: prediction.class.clone(),
            confidence: prediction.confidence,
            bounding_box: BoundingBox {
                x: x - width.div_euclid(2),
                y: y - height.div_euclid(2),
                width,
                height,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn center_form_converts_to_corner_form() {
        let prediction = RawPrediction {
            x: 100.0,
            y: 100.0,
            width: 40.0,
            height: 20.0,
            class: "acne".to_string(),
            confidence: 0.9,
        };

        let detection = Detection::from_prediction(&prediction);

        assert_eq!(
            detection.bounding_box,
            BoundingBox {
                x: 80,
                y: 90,
                width: 40,
                height: 20
            }
        );
    }

    #[test]
    fn fractional_centers_truncate_before_conversion() {
        let prediction = RawPrediction {
            x: 100.9,
            y: 99.7,
            width: 41.6,
            height: 21.2,
            class: "acne".to_string(),
            confidence: 0.5,
        };

        let detection = Detection::from_prediction(&prediction);

        // int(100.9) - 41 // 2 = 100 - 20, int(99.7) - 21 // 2 = 99 - 10
        assert_eq!(
            detection.bounding_box,
            BoundingBox {
                x: 80,
                y: 89,
                width: 41,
                height: 21
            }
        );
    }

    #[test]
    fn box_larger_than_center_yields_negative_corner() {
        let prediction = RawPrediction {
            x: 2.0,
            y: 3.0,
            width: 10.0,
            height: 9.0,
            class: "dark-circle".to_string(),
            confidence: 0.4,
        };

        let detection = Detection::from_prediction(&prediction);

        assert_eq!(detection.bounding_box.x, -3);
        // 9 // 2 floors to 4
        assert_eq!(detection.bounding_box.y, -1);
    }

    #[test]
    fn negative_extent_floors_instead_of_truncating() {
        // div_euclid matches floor division on negative operands,
        // -5 / 2 would truncate to -2 while -5 // 2 floors to -3.
        assert_eq!((-5i64).div_euclid(2), -3);
    }

    #[test]
    fn missing_field_is_rejected() {
        let value = json!({"x": 10.0, "y": 20.0, "width": 5.0, "height": 5.0, "class": "acne"});
        let parsed = serde_json::from_value::<RawPrediction>(value);
        assert!(parsed.is_err());
    }

    #[test]
    fn non_numeric_field_is_rejected() {
        let value = json!({
            "x": "10", "y": 20.0, "width": 5.0, "height": 5.0,
            "class": "acne", "confidence": 0.7
        });
        let parsed = serde_json::from_value::<RawPrediction>(value);
        assert!(parsed.is_err());
    }

    #[test]
    fn detection_serializes_in_api_shape() {
        let detection = Detection {
            class_name: "acne".to_string(),
            confidence: 0.82,
            bounding_box: BoundingBox {
                x: 80,
                y: 90,
                width: 40,
                height: 20,
            },
        };

        let value = serde_json::to_value(&detection).unwrap();
        assert_eq!(
            value,
            json!({
                "class": "acne",
                "confidence": 0.82,
                "bounding_box": {"x": 80, "y": 90, "width": 40, "height": 20}
            })
        );
    }
}
