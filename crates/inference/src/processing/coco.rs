/// torchvision's COCO category table: index 0 is background and the `N/A`
/// entries are ids unused by the 2017 detection split.
pub const COCO_CLASSES: [&str; 91] = [
    "__background__",
    "person",
    "bicycle",
    "car",
    "motorcycle",
    "airplane",
    "bus",
    "train",
    "truck",
    "boat",
    "traffic light",
    "fire hydrant",
    "N/A",
    "stop sign",
    "parking meter",
    "bench",
    "bird",
    "cat",
    "dog",
    "horse",
    "sheep",
    "cow",
    "elephant",
    "bear",
    "zebra",
    "giraffe",
    "N/A",
    "backpack",
    "umbrella",
    "N/A",
    "N/A",
    "handbag",
    "tie",
    "suitcase",
    "frisbee",
    "skis",
    "snowboard",
    "sports ball",
    "kite",
    "baseball bat",
    "baseball glove",
    "skateboard",
    "surfboard",
    "tennis racket",
    "bottle",
    "N/A",
    "wine glass",
    "cup",
    "fork",
    "knife",
    "spoon",
    "bowl",
    "banana",
    "apple",
    "sandwich",
    "orange",
    "broccoli",
    "carrot",
    "hot dog",
    "pizza",
    "donut",
    "cake",
    "chair",
    "couch",
    "potted plant",
    "bed",
    "N/A",
    "dining table",
    "N/A",
    "N/A",
    "toilet",
    "N/A",
    "tv",
    "laptop",
    "mouse",
    "remote",
    "keyboard",
    "cell phone",
    "microwave",
    "oven",
    "toaster",
    "sink",
    "refrigerator",
    "N/A",
    "book",
    "clock",
    "vase",
    "scissors",
    "teddy bear",
    "hair drier",
    "toothbrush",
];

/// Look up a raw model label. Placeholder slots resolve to `"N/A"`.
pub fn class_name(label: i64) -> Option<&'static str> {
    usize::try_from(label)
        .ok()
        .and_then(|idx| COCO_CLASSES.get(idx).copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_landmarks() {
        assert_eq!(class_name(0), Some("__background__"));
        assert_eq!(class_name(1), Some("person"));
        assert_eq!(class_name(18), Some("dog"));
        assert_eq!(class_name(90), Some("toothbrush"));
    }

    #[test]
    fn test_placeholder_slots() {
        let placeholders: Vec<usize> = COCO_CLASSES
            .iter()
            .enumerate()
            .filter(|(_, name)| **name == "N/A")
            .map(|(idx, _)| idx)
            .collect();

        assert_eq!(placeholders, vec![12, 26, 29, 30, 45, 66, 68, 69, 71, 83]);
    }

    #[test]
    fn test_out_of_range_labels() {
        assert_eq!(class_name(91), None);
        assert_eq!(class_name(-1), None);
    }
}
