mod common;

mod tests {
    use lumen_core::persistence::{
        RESTORE_RECORD_SIZE, RESTORE_RECORD_VERSION, fnv1_hash, preference_key,
    };
    use lumen_core::{ColorMode, PreferenceStore, RestoreRecord, StorageError};

    use super::common::*;

    fn sample_record() -> RestoreRecord {
        RestoreRecord {
            color_mode: ColorMode::RgbWhite,
            brightness: 0.25,
            red: 0.5,
            white: 0.75,
            effect: 3,
            ..RestoreRecord::with_state(true)
        }
    }

    #[test]
    fn test_fnv1_hash() {
        assert_eq!(fnv1_hash(""), 0x811C_9DC5);
        assert_eq!(fnv1_hash("a"), 0x050C_5D7E);
        assert_ne!(preference_key("kitchen"), preference_key("bedroom"));
    }

    #[test]
    fn test_record_layout() {
        let bytes = sample_record().encode();

        assert_eq!(bytes.len(), RESTORE_RECORD_SIZE);
        assert_eq!(bytes[0], RESTORE_RECORD_VERSION);
        assert_eq!(bytes[1], 1);
        assert_eq!(bytes[2], ColorMode::RgbWhite as u8);
    }

    #[test]
    fn test_decode_encoded_record() {
        let record = sample_record();
        assert_eq!(RestoreRecord::decode(&record.encode()), Ok(record));
    }

    #[test]
    fn test_decode_rejects_other_version() {
        let mut bytes = sample_record().encode();
        bytes[0] = RESTORE_RECORD_VERSION + 1;
        assert_eq!(RestoreRecord::decode(&bytes), Err(StorageError::SchemaMismatch));
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        let mut bytes = sample_record().encode();
        bytes[2] = 0xFF;
        assert_eq!(RestoreRecord::decode(&bytes), Err(StorageError::InvalidData));

        assert_eq!(
            RestoreRecord::decode(&bytes[..RESTORE_RECORD_SIZE - 1]),
            Err(StorageError::InvalidData)
        );
    }

    #[test]
    fn test_load_and_save_through_store() {
        let mut store = MemoryStore::default();
        let key = preference_key("garage");

        assert_eq!(
            RestoreRecord::load(&mut store, key),
            Err(StorageError::NotFound)
        );

        let record = sample_record();
        assert!(record.save(&mut store, key).is_ok());
        assert_eq!(RestoreRecord::load(&mut store, key), Ok(record));

        let mut buffer = [0u8; RESTORE_RECORD_SIZE];
        assert!(store.load(key, &mut buffer).is_ok());
        assert_eq!(buffer, record.encode());
    }

    #[test]
    fn test_values_conversion() {
        let record = sample_record();
        let values = record.to_values();

        assert!(values.is_on());
        assert_eq!(values.color_mode(), ColorMode::RgbWhite);
        assert_eq!(values.brightness(), 0.25);
        assert_eq!(values.white(), 0.75);
        assert_eq!(RestoreRecord::from_values(&values, 3), record);
    }

    #[test]
    fn test_storage_error_display() {
        assert_eq!(StorageError::SchemaMismatch.to_string(), "saved record version mismatch");
    }
}
