//! Voice pipeline service - Speak, think, respond
//!
//! Composes the speech, chat, and assistant services for the combined
//! endpoints:
//! 1. Transcribe the caller's audio (STT)
//! 2. Answer the transcript with a completion or an assistant turn
//! 3. Optionally synthesize the answer (TTS)
//!
//! Each step runs only after the previous one succeeded; the first error
//! ends the pipeline.

use std::{fmt, sync::Arc, time::Instant};

use domain::VoiceProvider;
use tracing::{info, instrument};

use crate::{
    error::ApplicationError,
    ports::{AudioUpload, SpeechAudio},
    services::{AssistantReply, AssistantService, ChatService, SpeechService},
};

/// Transcript of the caller's audio and the completion it produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpokenExchange {
    /// Transcribed caller audio
    pub text: String,
    /// Completion for the transcript
    pub response: String,
}

/// Assistant reply together with its synthesized audio
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpokenAssistantReply {
    pub reply: AssistantReply,
    pub audio: SpeechAudio,
}

/// Service composing STT, completion or assistant, and TTS
pub struct VoicePipelineService {
    speech: Arc<SpeechService>,
    chat: Arc<ChatService>,
    assistant: Arc<AssistantService>,
}

impl fmt::Debug for VoicePipelineService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoicePipelineService")
            .field("speech", &self.speech)
            .field("chat", &self.chat)
            .field("assistant", &self.assistant)
            .finish()
    }
}

impl VoicePipelineService {
    pub fn new(
        speech: Arc<SpeechService>,
        chat: Arc<ChatService>,
        assistant: Arc<AssistantService>,
    ) -> Self {
        Self {
            speech,
            chat,
            assistant,
        }
    }

    /// Transcribe `upload` and complete the transcript
    #[instrument(skip(self, upload), fields(size = upload.data.len()))]
    pub async fn transcribe_and_chat(
        &self,
        upload: AudioUpload,
    ) -> Result<SpokenExchange, ApplicationError> {
        let text = self.speech.transcribe_upload(upload).await?;
        let response = self.chat.chat(&text).await?;
        Ok(SpokenExchange { text, response })
    }

    /// Transcribe `upload`, complete the transcript, and speak the answer
    #[instrument(skip(self, upload), fields(size = upload.data.len(), provider = ?provider))]
    pub async fn transcribe_chat_and_speak(
        &self,
        upload: AudioUpload,
        provider: Option<VoiceProvider>,
    ) -> Result<(SpokenExchange, SpeechAudio), ApplicationError> {
        let start = Instant::now();

        let exchange = self.transcribe_and_chat(upload).await?;
        let audio = self.speech.synthesize(&exchange.response, provider).await?;

        #[allow(clippy::cast_possible_truncation)]
        let processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            processing_time_ms,
            audio_size = audio.data.len(),
            "Voice pipeline complete"
        );

        Ok((exchange, audio))
    }

    /// Transcribe `upload` and ask the assistant the transcript
    #[instrument(skip(self, upload), fields(size = upload.data.len()))]
    pub async fn ask_by_voice(
        &self,
        upload: AudioUpload,
        thread_id: Option<&str>,
    ) -> Result<AssistantReply, ApplicationError> {
        let question = self.speech.transcribe_upload(upload).await?;
        self.assistant.ask(&question, thread_id).await
    }

    /// Ask the assistant `question` and speak the reply
    #[instrument(skip(self, question), fields(question_len = question.len(), provider = ?provider))]
    pub async fn ask_aloud(
        &self,
        question: &str,
        thread_id: Option<&str>,
        provider: Option<VoiceProvider>,
    ) -> Result<SpokenAssistantReply, ApplicationError> {
        let reply = self.assistant.ask(question, thread_id).await?;
        let audio = self.speech.synthesize(&reply.response, provider).await?;
        Ok(SpokenAssistantReply { reply, audio })
    }

    /// Transcribe `upload`, ask the assistant, and speak the reply
    #[instrument(skip(self, upload), fields(size = upload.data.len(), provider = ?provider))]
    pub async fn ask_by_voice_aloud(
        &self,
        upload: AudioUpload,
        thread_id: Option<&str>,
        provider: Option<VoiceProvider>,
    ) -> Result<SpokenAssistantReply, ApplicationError> {
        let question = self.speech.transcribe_upload(upload).await?;
        self.ask_aloud(&question, thread_id, provider).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{
        AssistantTurn, MockCompletionPort, MockConversationPort, MockSynthesisPort,
        MockTranscriptionPort,
    };
    use domain::ThreadId;
    use mockall::predicate::eq;

    fn upload() -> AudioUpload {
        AudioUpload::new(b"ID3".to_vec())
            .with_filename("question.mp3")
            .with_content_type("audio/mpeg")
    }

    fn mp3(data: &[u8]) -> SpeechAudio {
        SpeechAudio {
            data: data.to_vec(),
            content_type: "audio/mpeg".to_string(),
        }
    }

    fn conversation() -> MockConversationPort {
        let mut mock = MockConversationPort::new();
        mock.expect_ensure_thread().returning(|t| {
            Ok(t.unwrap_or_else(|| ThreadId::new("thread_new").unwrap()))
        });
        mock.expect_send_turn().returning(|thread, text| {
            Ok(AssistantTurn {
                response: format!("assistant: {text}"),
                thread_id: thread,
            })
        });
        mock
    }

    fn pipeline(
        stt: MockTranscriptionPort,
        tts: MockSynthesisPort,
        completion: MockCompletionPort,
        conversation: MockConversationPort,
    ) -> VoicePipelineService {
        VoicePipelineService::new(
            Arc::new(SpeechService::new(Arc::new(stt), Arc::new(tts))),
            Arc::new(ChatService::new(Arc::new(completion))),
            Arc::new(AssistantService::new(Arc::new(conversation))),
        )
    }

    fn transcribing(text: &'static str) -> MockTranscriptionPort {
        let mut stt = MockTranscriptionPort::new();
        stt.expect_transcribe_upload()
            .times(1)
            .returning(move |_| Ok(text.to_string()));
        stt
    }

    #[tokio::test]
    async fn transcribe_chat_and_speak_chains_all_steps() {
        let mut completion = MockCompletionPort::new();
        completion
            .expect_complete()
            .with(eq("what time is it"))
            .times(1)
            .returning(|_| Ok("noon".to_string()));

        let mut tts = MockSynthesisPort::new();
        tts.expect_synthesize()
            .with(eq("noon"), eq(None::<VoiceProvider>))
            .times(1)
            .returning(|_, _| Ok(mp3(b"abcd")));

        let service = pipeline(
            transcribing("what time is it"),
            tts,
            completion,
            MockConversationPort::new(),
        );

        let (exchange, audio) = service.transcribe_chat_and_speak(upload(), None).await.unwrap();

        assert_eq!(exchange.text, "what time is it");
        assert_eq!(exchange.response, "noon");
        assert_eq!(audio.data, b"abcd");
    }

    #[tokio::test]
    async fn transcription_failure_stops_pipeline() {
        let mut stt = MockTranscriptionPort::new();
        stt.expect_transcribe_upload()
            .returning(|_| Err(ApplicationError::Speech("Invalid audio".to_string())));

        let mut completion = MockCompletionPort::new();
        completion.expect_complete().never();
        let mut tts = MockSynthesisPort::new();
        tts.expect_synthesize().never();

        let service = pipeline(stt, tts, completion, MockConversationPort::new());
        let result = service.transcribe_chat_and_speak(upload(), None).await;

        assert!(matches!(result, Err(ApplicationError::Speech(_))));
    }

    #[tokio::test]
    async fn transcribe_and_chat_skips_synthesis() {
        let mut completion = MockCompletionPort::new();
        completion
            .expect_complete()
            .returning(|_| Ok("pong".to_string()));
        let mut tts = MockSynthesisPort::new();
        tts.expect_synthesize().never();

        let service = pipeline(transcribing("ping"), tts, completion, MockConversationPort::new());
        let exchange = service.transcribe_and_chat(upload()).await.unwrap();

        assert_eq!(
            exchange,
            SpokenExchange {
                text: "ping".to_string(),
                response: "pong".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn ask_by_voice_uses_transcript_as_question() {
        let service = pipeline(
            transcribing("hello assistant"),
            MockSynthesisPort::new(),
            MockCompletionPort::new(),
            conversation(),
        );

        let reply = service
            .ask_by_voice(upload(), Some("thread_abc"))
            .await
            .unwrap();

        assert_eq!(reply.question, "hello assistant");
        assert_eq!(reply.response, "assistant: hello assistant");
        assert_eq!(reply.thread_id.as_str(), "thread_abc");
    }

    #[tokio::test]
    async fn ask_aloud_speaks_reply_with_selected_provider() {
        let mut tts = MockSynthesisPort::new();
        tts.expect_synthesize()
            .with(eq("assistant: hi"), eq(Some(VoiceProvider::ElevenLabs)))
            .times(1)
            .returning(|_, _| Ok(mp3(b"xi")));

        let service = pipeline(
            MockTranscriptionPort::new(),
            tts,
            MockCompletionPort::new(),
            conversation(),
        );

        let spoken = service
            .ask_aloud("hi", None, Some(VoiceProvider::ElevenLabs))
            .await
            .unwrap();

        assert_eq!(spoken.reply.thread_id.as_str(), "thread_new");
        assert_eq!(spoken.audio.data, b"xi");
    }

    #[tokio::test]
    async fn ask_by_voice_aloud_chains_all_steps() {
        let mut tts = MockSynthesisPort::new();
        tts.expect_synthesize()
            .times(1)
            .returning(|_, _| Ok(mp3(b"ok")));

        let service = pipeline(
            transcribing("spoken question"),
            tts,
            MockCompletionPort::new(),
            conversation(),
        );

        let spoken = service
            .ask_by_voice_aloud(upload(), Some("garbage"), None)
            .await
            .unwrap();

        assert_eq!(spoken.reply.question, "spoken question");
        assert_eq!(spoken.reply.thread_id.as_str(), "thread_new");
    }
}
