use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Result, SubgenError};
use crate::media::{MediaProcessor, MediaProcessorFactory};
use crate::recognize::{RecognitionRequest, RecognizerFactory, SpeechRecognizer, parse_response};
use crate::segment::Segmenter;
use crate::source::VideoSource;
use crate::storage::{BlobLayout, LocalObjectStore, ObjectStore};
use crate::subtitle::{self, SubtitleCue};
use crate::translate::{TextTranslator, TranslatorFactory};
use crate::update::{update_cues, UpdateSummary};

/// Working files removed after a run
const CLEANUP_EXTENSIONS: [&str; 11] = [
    "wav", "srt", "txt", "part", "mp4", "avi", "mov", "mkv", "wmv", "flv", "webm",
];

/// Everything needed to subtitle one video
#[derive(Debug, Clone)]
pub struct ProcessRequest {
    /// Local path or http(s) URL of the video
    pub input: String,
    /// Recognition language, e.g. "de_DE"
    pub language_code: String,
    /// Translation source language, e.g. "de"
    pub source_language: String,
    /// Translation target language, e.g. "en"
    pub target_language: String,
    pub output_dir: PathBuf,
}

impl ProcessRequest {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("input", &self.input),
            ("language_code", &self.language_code),
            ("source_language", &self.source_language),
            ("target_language", &self.target_language),
        ];

        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(SubgenError::Config(format!(
                    "Required field {} is missing. Requests need input, language_code, source_language and target_language",
                    name
                )));
            }
        }

        // Both languages name the same output files
        if self.source_language.trim().eq_ignore_ascii_case(self.target_language.trim()) {
            return Err(SubgenError::Config(format!(
                "source_language and target_language must differ, both are '{}'",
                self.source_language.trim()
            )));
        }
        Ok(())
    }
}

/// Outcome of a processed video
#[derive(Debug, Clone)]
pub struct ProcessReport {
    pub cue_count: usize,
    pub update: UpdateSummary,
    pub source_subtitles: PathBuf,
    pub target_subtitles: PathBuf,
    pub source_uri: String,
    pub target_uri: String,
}

pub struct Workflow {
    config: Config,
    media: Box<dyn MediaProcessor>,
    recognizer: Box<dyn SpeechRecognizer>,
    translator: Box<dyn TextTranslator>,
    store: Box<dyn ObjectStore>,
}

impl Workflow {
    pub fn new(
        config: Config,
        media: Box<dyn MediaProcessor>,
        recognizer: Box<dyn SpeechRecognizer>,
        translator: Box<dyn TextTranslator>,
        store: Box<dyn ObjectStore>,
    ) -> Self {
        Self {
            config,
            media,
            recognizer,
            translator,
            store,
        }
    }

    /// Wire the default collaborators from configuration
    pub fn from_config(
        config: Config,
        transcript: Option<PathBuf>,
        translation: Option<PathBuf>,
    ) -> Result<Self> {
        let media = MediaProcessorFactory::create_processor(config.media.clone());
        let recognizer = RecognizerFactory::create_recognizer(config.recognizer.clone(), transcript);
        let translator = TranslatorFactory::create_translator(config.translate.clone(), translation)?;
        let store = Box::new(LocalObjectStore::new(config.storage.root.clone()));

        Ok(Self::new(config, media, recognizer, translator, store))
    }

    /// Download, transcribe, translate and subtitle one video
    pub async fn process_video(&self, request: &ProcessRequest) -> Result<ProcessReport> {
        request.validate()?;
        self.media.check_availability().await?;

        let run_id = Uuid::new_v4();
        let work_dir = self
            .config
            .workflow
            .work_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("subgen"))
            .join(run_id.to_string());
        fs::create_dir_all(&work_dir).await?;

        info!("Run {}: processing {} in {}", run_id, request.input, work_dir.display());

        let result = self.run_pipeline(request, &work_dir).await;

        if self.config.workflow.keep_intermediate {
            info!("Keeping intermediate files in {}", work_dir.display());
        } else {
            clean_up(&work_dir).await;
        }

        match &result {
            Ok(report) => info!("Run {} finished with {} cues", run_id, report.cue_count),
            Err(e) => warn!("Run {} failed: {}", run_id, e),
        }
        result
    }

    async fn run_pipeline(&self, request: &ProcessRequest, work_dir: &Path) -> Result<ProcessReport> {
        let source_language = request.source_language.trim();
        let target_language = request.target_language.trim();

        // Step 1: Fetch the video and publish it
        let source = VideoSource::parse(&request.input);
        let video_name = source.file_name("video.mp4");
        let video_path = work_dir.join(&video_name);
        source.fetch(&video_path).await?;
        self.store.upload(&video_path, &BlobLayout::video(&video_name)).await?;

        // Step 2: Extract audio with the video's own stream parameters
        let audio_info = self.media.probe_audio(&video_path).await?;
        let audio_name = "audio.wav";
        let audio_path = work_dir.join(audio_name);
        self.media.extract_audio(&video_path, &audio_path, &audio_info).await?;
        self.store.upload(&audio_path, &BlobLayout::audio(audio_name)).await?;

        // Step 3: Recognize speech and segment it into cues
        let recognition_request = RecognitionRequest {
            language_code: request.language_code.trim().to_string(),
            channels: audio_info.channels,
            sample_rate: audio_info.sample_rate,
        };
        let results = self.recognizer.recognize(&audio_path, &recognition_request).await?;
        let cues = Segmenter::new(self.config.segmenter.clone()).segment(&results)?;
        info!("Segmented transcript into {} cues", cues.len());

        // Step 4: Publish source subtitles and the text to translate
        let source_srt = work_dir.join(format!("{}.srt", source_language));
        let source_uri = self.publish_subtitles(&cues, &source_srt, source_language).await?;

        let text_path = work_dir.join(format!("{}.txt", source_language));
        subtitle::write_text(&cues, &text_path).await?;
        self.store.upload(&text_path, &BlobLayout::transcript_text(source_language)).await?;

        // Step 5: Translate and publish the translation
        let text = subtitle::to_plain_text(&cues);
        let translated = self.translator.translate(&text, source_language, target_language).await?;

        let translated_blob = BlobLayout::translated_text(source_language, target_language);
        let translated_path = work_dir.join(format!("{}_{}_translations.txt", source_language, target_language));
        fs::write(&translated_path, &translated).await?;
        self.store.upload(&translated_path, &translated_blob).await?;
        let translated = self.store.download_text(&translated_blob).await?;

        // Step 6: Carry the translation onto the original timing
        let mut target_cues = cues.clone();
        let update = update_cues(&mut target_cues, &translated, &self.config.update)?;

        let target_srt = work_dir.join(format!("{}.srt", target_language));
        let target_uri = self.publish_subtitles(&target_cues, &target_srt, target_language).await?;

        // Step 7: Hand the subtitles to the caller
        fs::create_dir_all(&request.output_dir).await?;
        let video_stem = Path::new(&video_name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video".to_string());

        let source_subtitles = request.output_dir.join(format!("{}_{}.srt", video_stem, source_language));
        let target_subtitles = request.output_dir.join(format!("{}_{}.srt", video_stem, target_language));
        fs::copy(&source_srt, &source_subtitles).await?;
        fs::copy(&target_srt, &target_subtitles).await?;

        Ok(ProcessReport {
            cue_count: cues.len(),
            update,
            source_subtitles,
            target_subtitles,
            source_uri,
            target_uri,
        })
    }

    async fn publish_subtitles(&self, cues: &[SubtitleCue], path: &Path, language: &str) -> Result<String> {
        info!("Writing {} subtitles to: {}", language, path.display());
        subtitle::write_srt(cues, path).await?;

        let blob_name = BlobLayout::subtitles(language);
        self.store.upload(path, &blob_name).await?;
        Ok(self.store.uri(&blob_name))
    }

    /// Segment a saved recognize response into a SubRip file
    pub async fn segment_transcript<P: AsRef<Path>>(&self, transcript_path: P, output_path: P) -> Result<usize> {
        let transcript_path = transcript_path.as_ref();
        if !transcript_path.exists() {
            return Err(SubgenError::FileNotFound(transcript_path.display().to_string()));
        }

        let content = fs::read_to_string(transcript_path).await?;
        let results = parse_response(&content)?;
        let cues = Segmenter::new(self.config.segmenter.clone()).segment(&results)?;

        subtitle::write_srt(&cues, output_path).await?;
        Ok(cues.len())
    }

    /// Replace the text of a SubRip file with translated lines
    pub async fn update_subtitles<P: AsRef<Path>>(
        &self,
        subtitles_path: P,
        translation_path: P,
        output_path: P,
    ) -> Result<UpdateSummary> {
        let mut cues = subtitle::read_srt(subtitles_path).await?;

        let translation_path = translation_path.as_ref();
        if !translation_path.exists() {
            return Err(SubgenError::FileNotFound(translation_path.display().to_string()));
        }
        let translated = fs::read_to_string(translation_path).await?;

        let summary = update_cues(&mut cues, &translated, &self.config.update)?;
        subtitle::write_srt(&cues, output_path).await?;
        Ok(summary)
    }

    /// Write the lines of a SubRip file as translation input
    pub async fn export_text<P: AsRef<Path>>(&self, subtitles_path: P, output_path: P) -> Result<usize> {
        let cues = subtitle::read_srt(subtitles_path).await?;
        subtitle::write_text(&cues, output_path).await?;
        Ok(cues.len())
    }

    /// Extract audio from a video file with its own stream parameters
    pub async fn extract_audio<P: AsRef<Path>>(&self, video_path: P, audio_path: P) -> Result<()> {
        let video_path = video_path.as_ref();
        if !video_path.exists() {
            return Err(SubgenError::FileNotFound(video_path.display().to_string()));
        }

        let audio_info = self.media.probe_audio(video_path).await?;
        self.media.extract_audio(video_path, audio_path.as_ref(), &audio_info).await
    }
}

/// Remove working files left in `work_dir`, then the directory if it is empty
pub async fn clean_up(work_dir: &Path) {
    let files = WalkDir::new(work_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| CLEANUP_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        })
        .map(|entry| entry.into_path());

    for path in files {
        if let Err(e) = fs::remove_file(&path).await {
            warn!("Failed to remove {}: {}", path.display(), e);
        }
    }

    // Leftovers that are not ours keep the directory alive
    if fs::remove_dir(work_dir).await.is_ok() {
        info!("Removed working directory {}", work_dir.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::config::ExcessLinePolicy;
    use crate::media::{AudioInfo, MockMediaProcessor};
    use crate::recognize::MockSpeechRecognizer;
    use crate::segment::{RecognitionResult, Word};
    use crate::translate::MockTextTranslator;

    fn w(text: &str, start: f64, end: f64) -> Word {
        Word::new(text, Duration::from_secs_f64(start), Duration::from_secs_f64(end))
    }

    fn greeting() -> Vec<RecognitionResult> {
        vec![RecognitionResult::from_words(vec![
            w("Hallo", 0.0, 0.5),
            w("Welt.", 0.5, 1.0),
            w("Wie", 1.0, 1.2),
            w("geht", 1.2, 1.4),
            w("es,", 1.4, 1.6),
            w("dir?", 1.6, 2.0),
        ])]
    }

    fn media() -> MockMediaProcessor {
        let mut media = MockMediaProcessor::new();
        media.expect_check_availability().returning(|| Ok(()));
        media.expect_probe_audio().returning(|_| {
            Ok(AudioInfo {
                channels: 2,
                sample_rate: 44_100,
                bit_rate: Some(128_000),
            })
        });
        media.expect_extract_audio().returning(|_, audio, _| {
            std::fs::write(audio, b"RIFF").unwrap();
            Ok(())
        });
        media
    }

    fn recognizer() -> MockSpeechRecognizer {
        let mut recognizer = MockSpeechRecognizer::new();
        recognizer
            .expect_recognize()
            .withf(|_, request| {
                request.language_code == "de_DE" && request.channels == 2 && request.sample_rate == 44_100
            })
            .returning(|_, _| Ok(greeting()));
        recognizer
    }

    fn translator(reply: &'static str) -> MockTextTranslator {
        let mut translator = MockTextTranslator::new();
        translator
            .expect_translate()
            .withf(|text, source, target| {
                text == "Hallo Welt.\nWie geht es,\ndir?\n" && source == "de" && target == "en"
            })
            .returning(move |_, _, _| Ok(reply.to_string()));
        translator
    }

    struct Fixture {
        root: tempfile::TempDir,
        config: Config,
        request: ProcessRequest,
    }

    fn fixture() -> Fixture {
        let root = tempfile::tempdir().unwrap();
        let video = root.path().join("talk.mp4");
        std::fs::write(&video, b"video").unwrap();

        let mut config = Config::default();
        config.storage.root = root.path().join("bucket");
        config.workflow.work_dir = Some(root.path().join("work"));

        let request = ProcessRequest {
            input: video.display().to_string(),
            language_code: "de_DE".to_string(),
            source_language: "de".to_string(),
            target_language: "en".to_string(),
            output_dir: root.path().join("out"),
        };

        Fixture { root, config, request }
    }

    fn workflow(config: Config, reply: &'static str) -> Workflow {
        let store = Box::new(LocalObjectStore::new(config.storage.root.clone()));
        Workflow::new(
            config,
            Box::new(media()),
            Box::new(recognizer()),
            Box::new(translator(reply)),
            store,
        )
    }

    fn work_dir_entries(root: &Path) -> usize {
        std::fs::read_dir(root.join("work")).map(|dir| dir.count()).unwrap_or(0)
    }

    #[tokio::test]
    async fn test_process_video_end_to_end() {
        let fixture = fixture();
        let workflow = workflow(fixture.config.clone(), "Hello world.\nHow are you\ndoing?\n");

        let report = workflow.process_video(&fixture.request).await.unwrap();

        assert_eq!(report.cue_count, 3);
        assert_eq!(report.update.updated, 3);
        assert_eq!(report.target_subtitles, fixture.root.path().join("out").join("talk_en.srt"));

        let english = std::fs::read_to_string(&report.target_subtitles).unwrap();
        assert_eq!(
            english,
            "1\n00:00:00,000 --> 00:00:01,000\nHello world.\n\n\
             2\n00:00:01,000 --> 00:00:01,600\nHow are you\n\n\
             3\n00:00:01,600 --> 00:00:02,000\ndoing?\n\n"
        );
        let german = std::fs::read_to_string(&report.source_subtitles).unwrap();
        assert!(german.contains("Hallo Welt."));

        let bucket = fixture.root.path().join("bucket");
        for blob in [
            "videos/talk.mp4",
            "audios/audio.wav",
            "subtitles/de.srt",
            "subtitles/en.srt",
            "texts/de.txt",
            "translated_texts/en/de_en_translations.txt",
        ] {
            assert!(bucket.join(blob).exists(), "missing blob {}", blob);
        }
        assert!(report.target_uri.ends_with("subtitles/en.srt"));

        assert_eq!(work_dir_entries(fixture.root.path()), 0);
    }

    #[tokio::test]
    async fn test_line_count_mismatch_fails_and_cleans_up() {
        let fixture = fixture();
        let workflow = workflow(fixture.config.clone(), "Hello world.\nHow are you\n");

        let err = workflow.process_video(&fixture.request).await.unwrap_err();

        assert!(matches!(
            err,
            SubgenError::TranslationLineCountMismatch { expected: 3, actual: 2 }
        ));
        assert!(!fixture.root.path().join("out").join("talk_en.srt").exists());
        assert_eq!(work_dir_entries(fixture.root.path()), 0);
    }

    #[tokio::test]
    async fn test_excess_lines_rejected_by_policy() {
        let fixture = fixture();
        let mut config = fixture.config.clone();
        config.update.excess_lines = ExcessLinePolicy::Error;
        let workflow = workflow(config, "Hello world.\nHow are you\ndoing?\nextra\n");

        let err = workflow.process_video(&fixture.request).await.unwrap_err();
        assert!(matches!(
            err,
            SubgenError::TranslationLineCountMismatch { expected: 3, actual: 4 }
        ));
    }

    #[tokio::test]
    async fn test_keep_intermediate_files() {
        let fixture = fixture();
        let mut config = fixture.config.clone();
        config.workflow.keep_intermediate = true;
        let workflow = workflow(config, "Hello world.\nHow are you\ndoing?\n");

        workflow.process_video(&fixture.request).await.unwrap();

        assert_eq!(work_dir_entries(fixture.root.path()), 1);
    }

    #[tokio::test]
    async fn test_rejects_missing_request_fields() {
        let fixture = fixture();
        let workflow = Workflow::new(
            fixture.config.clone(),
            Box::new(MockMediaProcessor::new()),
            Box::new(MockSpeechRecognizer::new()),
            Box::new(MockTextTranslator::new()),
            Box::new(LocalObjectStore::new(fixture.config.storage.root.clone())),
        );
        let request = ProcessRequest {
            target_language: " ".to_string(),
            ..fixture.request.clone()
        };

        let err = workflow.process_video(&request).await.unwrap_err();
        assert!(matches!(err, SubgenError::Config(message) if message.contains("target_language")));
    }

    #[tokio::test]
    async fn test_rejects_same_source_and_target_language() {
        let fixture = fixture();
        let workflow = Workflow::new(
            fixture.config.clone(),
            Box::new(MockMediaProcessor::new()),
            Box::new(MockSpeechRecognizer::new()),
            Box::new(MockTextTranslator::new()),
            Box::new(LocalObjectStore::new(fixture.config.storage.root.clone())),
        );
        let request = ProcessRequest {
            target_language: "DE".to_string(),
            ..fixture.request.clone()
        };

        let err = workflow.process_video(&request).await.unwrap_err();
        assert!(matches!(err, SubgenError::Config(message) if message.contains("must differ")));
        assert!(!fixture.root.path().join("bucket").exists());
        assert!(!fixture.root.path().join("out").exists());
    }

    #[tokio::test]
    async fn test_clean_up_only_removes_working_files() {
        let dir = tempfile::tempdir().unwrap();
        let work = dir.path().join("run");
        std::fs::create_dir(&work).unwrap();
        for name in ["audio.wav", "video.MP4", "de.srt", "de.txt", "notes.md"] {
            std::fs::write(work.join(name), b"x").unwrap();
        }

        clean_up(&work).await;

        let remaining: Vec<_> = std::fs::read_dir(&work)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(remaining, vec!["notes.md"]);
    }

    #[tokio::test]
    async fn test_segment_update_and_export_files() {
        let dir = tempfile::tempdir().unwrap();
        let transcript = dir.path().join("de.json");
        std::fs::write(
            &transcript,
            r#"{"results":[{"alternatives":[{"words":[
                {"word":"Hallo","endTime":"0.5s"},
                {"word":"Welt.","startTime":"0.5s","endTime":"1s"}
            ]}]}]}"#,
        )
        .unwrap();
        let translation = dir.path().join("en.txt");
        std::fs::write(&translation, "Hello world.\n").unwrap();

        let workflow = Workflow::new(
            Config::default(),
            Box::new(MockMediaProcessor::new()),
            Box::new(MockSpeechRecognizer::new()),
            Box::new(MockTextTranslator::new()),
            Box::new(LocalObjectStore::new(dir.path().join("bucket"))),
        );

        let de_srt = dir.path().join("de.srt");
        assert_eq!(workflow.segment_transcript(&transcript, &de_srt).await.unwrap(), 1);

        let de_txt = dir.path().join("de.txt");
        assert_eq!(workflow.export_text(&de_srt, &de_txt).await.unwrap(), 1);
        assert_eq!(std::fs::read_to_string(&de_txt).unwrap(), "Hallo Welt.\n");

        let en_srt = dir.path().join("en.srt");
        let summary = workflow.update_subtitles(&de_srt, &translation, &en_srt).await.unwrap();
        assert_eq!(summary.updated, 1);
        assert_eq!(
            std::fs::read_to_string(&en_srt).unwrap(),
            "1\n00:00:00,000 --> 00:00:01,000\nHello world.\n\n"
        );
    }
}
