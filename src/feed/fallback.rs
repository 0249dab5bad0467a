//! Sample documents shown when the store is empty or unreachable.

use once_cell::sync::Lazy;

use crate::models::Document;

/// Owner id carried by every sample document.
pub const FALLBACK_OWNER: &str = "fallback";

static FALLBACK_DOCUMENTS: Lazy<Vec<Document>> = Lazy::new(|| {
    vec![
        sample(
            "fallback-1",
            "Laals UI Vision – Complete SaaS Design System",
            "🎨",
            "A comprehensive design system and product vision for Laals - my SaaS company. \
             Includes UI patterns, color schemes, component library, and the complete product \
             lineup with Supabase backend architecture.",
            &["SaaS", "UI", "ProductVision", "Design"],
            "2024-12-15T00:00:00.000000Z",
            DESIGN_SYSTEM_BODY,
        ),
        sample(
            "fallback-2",
            "AI Prompt Engineering Masterclass",
            "🤖",
            "Advanced techniques for crafting effective AI prompts. Covers role-based prompting, \
             chain-of-thought reasoning, and context optimization strategies.",
            &["AI", "Reference", "Workflow"],
            "2024-12-10T00:00:00.000000Z",
            PROMPT_ENGINEERING_BODY,
        ),
    ]
});

/// The static sample list, newest first.
pub fn fallback_documents() -> Vec<Document> {
    FALLBACK_DOCUMENTS.clone()
}

fn sample(
    id: &str,
    title: &str,
    emoji: &str,
    excerpt: &str,
    tags: &[&str],
    date: &str,
    content: &str,
) -> Document {
    Document {
        id: id.to_string(),
        title: title.to_string(),
        emoji: Some(emoji.to_string()),
        excerpt: Some(excerpt.to_string()),
        content: content.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        created_at: date.to_string(),
        updated_at: date.to_string(),
        owner_id: FALLBACK_OWNER.to_string(),
        is_public: true,
    }
}

const DESIGN_SYSTEM_BODY: &str = r#"# Laals UI Vision – Complete SaaS Design System

## 🎯 Vision Statement
Laals represents the future of SaaS tooling - clean, powerful, and beautifully crafted. Our design system embodies simplicity without sacrificing functionality.

## 🎨 Design Principles

### Color Palette
- **Primary**: Deep Blue (#1e40af) - Trust, professionalism
- **Secondary**: Emerald (#059669) - Growth, success
- **Accent**: Purple (#7c3aed) - Innovation, creativity
- **Neutral**: Slate grays for text and backgrounds

### Typography
- **Headers**: Inter Bold/Semibold
- **Body**: Inter Regular
- **Code**: JetBrains Mono

### Component Philosophy
1. **Glassmorphism**: Subtle transparency with backdrop blur
2. **Rounded Corners**: 12px border radius for cards, 8px for buttons
3. **Micro-interactions**: Smooth hover states and transitions
4. **Consistent Spacing**: 8px grid system

## 🏗️ Product Lineup

### 1. Laals Analytics
Real-time business intelligence dashboard
- Custom charts and visualizations
- Team collaboration features
- Advanced filtering and segmentation

### 2. Laals CRM
Customer relationship management
- Contact management
- Pipeline tracking
- Automated workflows

### 3. Laals Workspace
Team productivity suite
- Project management
- Document collaboration
- Time tracking

## 🔧 Technical Stack

### Frontend
- **React + TypeScript**: Component-based architecture
- **Tailwind CSS**: Utility-first styling
- **Framer Motion**: Smooth animations
- **Recharts**: Data visualization

### Backend (Supabase)
- **PostgreSQL**: Relational database
- **Row Level Security**: Fine-grained permissions
- **Edge Functions**: Serverless API endpoints
- **Real-time subscriptions**: Live data updates

## 📱 Responsive Design
- **Mobile-first**: Optimized for touch interfaces
- **Tablet adaptation**: Collapsible sidebars
- **Desktop experience**: Multi-panel layouts

## 🚀 Future Roadmap
- Dark mode perfection
- Advanced theming system
- Component marketplace
- API documentation portal

This vision document serves as our north star for all design and development decisions."#;

const PROMPT_ENGINEERING_BODY: &str = r#"# AI Prompt Engineering Masterclass

## 🎯 Core Principles

### 1. Role-Based Prompting
Always establish a clear role for the AI:
- "You are a senior software architect..."
- "Acting as a UX designer with 10 years experience..."
- "As a technical writer specializing in API documentation..."

### 2. Context Window Optimization
- Front-load the most important information
- Use structured formats (markdown, JSON)
- Reference previous conversations explicitly

### 3. Chain-of-Thought Reasoning
Guide the AI through logical steps:
1. "First, analyze the problem"
2. "Then, consider alternative approaches"
3. "Finally, recommend the best solution"

## 🛠️ Advanced Techniques

### Temperature Control
- **0.1-0.3**: Factual, consistent responses
- **0.4-0.7**: Balanced creativity and accuracy
- **0.8-1.0**: Maximum creativity, less predictable

### Prompt Chaining
Break complex tasks into smaller, sequential prompts:
1. Research phase
2. Analysis phase
3. Synthesis phase
4. Output formatting

### Meta-Prompting
Teach the AI to improve its own responses:
"Before answering, consider what additional context would improve this response."

## 📝 Templates

### Code Review Template
```
Role: Senior code reviewer
Task: Review the following code for:
- Performance issues
- Security vulnerabilities  
- Best practices adherence
- Readability improvements

Code: [INSERT CODE]

Format your response as:
1. Issues found
2. Specific recommendations
3. Improved code example
```

### Business Analysis Template
```
Context: [BUSINESS SCENARIO]
Objective: [SPECIFIC GOAL]
Constraints: [LIMITATIONS]

Analyze this scenario using:
1. SWOT framework
2. Risk assessment
3. Resource requirements
4. Success metrics
```

This is my go-to reference for all AI interactions."#;
